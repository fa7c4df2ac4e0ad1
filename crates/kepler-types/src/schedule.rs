// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numerical tolerance used throughout for mutual-exclusion / "is it roughly
/// zero" checks (spec invariant epsilon).
pub const EPSILON: f64 = 1e-6;

/// What a [`PlannedSlot`] is "for", derived deterministically from its
/// decision values. A named, closed enum (never a stringly-typed tag) so
/// that an unrecognized value is a deserialization error, not a silent
/// pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Charge,
    Discharge,
    Export,
    WaterHeat,
    Hold,
    PvCharge,
}

impl Classification {
    /// Classify a slot from its solved decision values, per spec.md §4.C:
    /// Export first, then Charge (refined to `PvCharge` when PV alone covers
    /// it), then Discharge, then WaterHeat, else Hold.
    #[must_use]
    pub fn classify(
        charge_kw: f64,
        discharge_kw: f64,
        export_kw: f64,
        water_heat_active: bool,
        pv_kwh: f64,
        slot_hours: f64,
    ) -> Self {
        if export_kw > EPSILON {
            Classification::Export
        } else if charge_kw > EPSILON {
            if pv_kwh >= charge_kw * slot_hours {
                Classification::PvCharge
            } else {
                Classification::Charge
            }
        } else if discharge_kw > EPSILON {
            Classification::Discharge
        } else if water_heat_active {
            Classification::WaterHeat
        } else {
            Classification::Hold
        }
    }
}

/// One 15-minute unit of a solved (or historical) [`Schedule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSlot {
    pub start_time: DateTime<Utc>,
    pub charge_kw: f64,
    pub discharge_kw: f64,
    pub export_kw: f64,
    pub water_heat_active: bool,
    /// Projected SoC at the *end* of this slot.
    pub projected_soc_percent: f64,
    /// Rounded target the Executor treats as a floor (discharge) or a
    /// reference (charge/hold).
    pub soc_target_percent: f64,
    pub classification: Classification,
    pub import_price: f64,
    pub export_price: f64,
    /// True if `start_time < now` at the time this schedule was produced;
    /// such slots are copied from the execution log, not optimized.
    pub is_historical: bool,
    /// Present only when `is_historical`, mirrored from the execution log.
    pub actual_soc_percent: Option<f64>,
}

impl PlannedSlot {
    #[must_use]
    pub fn respects_mutual_exclusion(&self) -> bool {
        self.charge_kw * self.discharge_kw <= EPSILON
    }

    #[must_use]
    pub fn soc_within_bounds(&self, min_soc: f64, max_soc: f64) -> bool {
        self.projected_soc_percent >= min_soc - EPSILON
            && self.projected_soc_percent <= max_soc + EPSILON
    }
}

/// Schedule-level metadata persisted alongside the slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMeta {
    pub planned_at: DateTime<Utc>,
    pub planner_version: String,
    pub horizon_start: DateTime<Utc>,
    pub horizon_end: DateTime<Utc>,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

/// The full persisted schedule document: the contract with the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub meta: ScheduleMeta,
    pub slots: Vec<PlannedSlot>,
}

impl Schedule {
    /// Invariant I1: covers exactly the configured horizon length, strictly
    /// increasing `start_time`, aligned to the 15-minute grid.
    #[must_use]
    pub fn is_well_formed(&self, expected_len: usize) -> bool {
        if self.slots.len() != expected_len {
            return false;
        }
        self.slots.windows(2).all(|w| w[0].start_time < w[1].start_time)
    }

    #[must_use]
    pub fn slot_for(&self, timestamp: DateTime<Utc>) -> Option<&PlannedSlot> {
        self.slots.iter().find(|s| {
            let end = s.start_time + chrono::Duration::minutes(crate::slot::SLOT_MINUTES);
            timestamp >= s.start_time && timestamp < end
        })
    }
}
