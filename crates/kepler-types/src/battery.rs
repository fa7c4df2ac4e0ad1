// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use serde::{Deserialize, Serialize};

/// Snapshot of the battery's physical configuration and live state, read from
/// the actuator at plan time. `wac_sek_per_kwh` is reporting-only: it must
/// never be read by the Planner's objective (see [`crate::ledger::LedgerRecord`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryState {
    pub capacity_kwh: f64,
    pub min_soc_percent: f64,
    pub max_soc_percent: f64,
    pub max_charge_kw: f64,
    pub max_discharge_kw: f64,
    pub roundtrip_efficiency: f64,
    pub current_soc_percent: f64,
}

impl BatteryState {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.capacity_kwh > 0.0
            && (0.0..=100.0).contains(&self.min_soc_percent)
            && (0.0..=100.0).contains(&self.max_soc_percent)
            && self.min_soc_percent <= self.max_soc_percent
            && self.max_charge_kw >= 0.0
            && self.max_discharge_kw >= 0.0
            && self.roundtrip_efficiency > 0.0
            && self.roundtrip_efficiency <= 1.0
            && (0.0..=100.0).contains(&self.current_soc_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_state() -> BatteryState {
        BatteryState {
            capacity_kwh: 10.0,
            min_soc_percent: 10.0,
            max_soc_percent: 90.0,
            max_charge_kw: 5.0,
            max_discharge_kw: 5.0,
            roundtrip_efficiency: 0.9,
            current_soc_percent: 50.0,
        }
    }

    #[test]
    fn rejects_min_above_max() {
        let mut s = valid_state();
        s.min_soc_percent = 95.0;
        assert!(!s.is_valid());
    }

    #[test]
    fn rejects_zero_efficiency() {
        let mut s = valid_state();
        s.roundtrip_efficiency = 0.0;
        assert!(!s.is_valid());
    }

    #[test]
    fn accepts_nominal_state() {
        assert!(valid_state().is_valid());
    }
}
