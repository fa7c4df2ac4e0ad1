// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The Planner ("Kepler"): a MILP optimizer that turns a price/forecast
//! series and a battery state into a cost-minimal 48-hour schedule.

pub mod historical_merge;
pub mod model;
pub mod solver;
pub mod terminal_value;

use chrono::{DateTime, Utc};
use kepler_types::{BatteryState, ForecastPoint, KeplerError, PlannedSlot, Schedule, ScheduleMeta};

pub use solver::{HighsSolver, Solver};

/// Everything the Planner needs for one solve. One slot's worth of forecast
/// is `forecast[t]`; `forecast.len()` is the horizon length.
#[derive(Debug, Clone)]
pub struct PlannerRequest {
    pub now: DateTime<Utc>,
    pub horizon_start: DateTime<Utc>,
    pub forecast: Vec<ForecastPoint>,
    pub battery: BatteryState,
    pub water_heater: Option<WaterHeaterInput>,
    pub export: ExportInput,
    pub wear_cost_sek_per_kwh: f64,
    pub ramping_cost_sek_per_kw: f64,
    pub planner_version: String,
}

#[derive(Debug, Clone, Copy)]
pub struct WaterHeaterInput {
    pub power_kw: f64,
    pub min_kwh_per_day: f64,
    pub max_hours_between_heating: f64,
    pub already_heated_today_kwh: f64,
    pub comfort_penalty_sek_per_hour_over_gap: f64,
    pub hard_gap_enforcement: bool,
    /// Non-zero length enables an anti-legionella quota: force `w[t]=1` for
    /// this many of the earliest horizon slots instead of the usual daily
    /// minimum (vacation mode, spec.md §4.C.5/§4.C.6).
    pub forced_on_slots: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportInput {
    pub enabled: bool,
    pub max_export_kw: f64,
}

#[derive(Debug, Clone)]
pub struct PlannerResponse {
    pub meta: ScheduleMeta,
    pub slots: Vec<PlannedSlot>,
    pub objective_value_sek: f64,
}

/// Validate, solve, classify, and merge in historical slots. Owns no I/O:
/// callers supply the forecast and battery snapshot and persist the result.
pub fn plan(
    request: &PlannerRequest,
    store: &dyn crate::store::Store,
    solver: &dyn Solver,
) -> Result<PlannerResponse, KeplerError> {
    validate_request(request)?;

    let forward_forecast: Vec<&ForecastPoint> = request
        .forecast
        .iter()
        .filter(|p| p.start_time >= request.now)
        .collect();

    let tv_sek_per_kwh = terminal_value::terminal_value(&request.forecast);

    let solved = solver.solve(request, &forward_forecast, tv_sek_per_kwh)?;

    let mut slots = model::slots_from_solution(request, &forward_forecast, &solved);

    let historical = historical_merge::historical_slots(request, store)?;
    let mut all_slots = historical;
    all_slots.append(&mut slots);

    let meta = ScheduleMeta {
        planned_at: request.now,
        planner_version: request.planner_version.clone(),
        horizon_start: request.horizon_start,
        horizon_end: request
            .forecast
            .last()
            .map(|p| p.start_time + chrono::Duration::minutes(kepler_types::SLOT_MINUTES))
            .unwrap_or(request.horizon_start),
        last_error: None,
        last_error_at: None,
    };

    Ok(PlannerResponse {
        meta,
        slots: all_slots,
        objective_value_sek: solved.objective_value,
    })
}

fn validate_request(request: &PlannerRequest) -> Result<(), KeplerError> {
    if !request.battery.is_valid() {
        return Err(KeplerError::InvalidInput(
            "battery state fails min<=max / bounds checks".to_string(),
        ));
    }
    if request.forecast.is_empty() {
        return Err(KeplerError::InvalidInput("forecast is empty".to_string()));
    }
    if let Some(wh) = &request.water_heater
        && wh.power_kw <= 0.0
    {
        return Err(KeplerError::InvalidInput(
            "water heater power_kw must be positive when water heating is modeled".to_string(),
        ));
    }
    Ok(())
}
