// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use serde::{Deserialize, Serialize};

/// The single mutable weighted-average-cost record for energy currently
/// stored in the battery. Reporting-only: must never feed the Planner's
/// objective (the Sunk Cost Fallacy spec.md §4.C warns against).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub stored_kwh: f64,
    pub total_cost_sek: f64,
}

impl LedgerRecord {
    /// WAC for an empty ledger (`stored_kwh <= 0`) is a configured default
    /// (spec.md §3), not a fixed constant — callers pass
    /// `SystemConfig.battery.default_wac_sek_per_kwh`.
    #[must_use]
    pub fn wac_sek_per_kwh(&self, default_sek_per_kwh: f64) -> f64 {
        if self.stored_kwh > 0.0 {
            self.total_cost_sek / self.stored_kwh
        } else {
            default_sek_per_kwh
        }
    }

    /// Apply a charging event of `delta_kwh` (> 0) at unit price `price`.
    /// Energy and cost both increase; WAC moves toward `price`.
    pub fn apply_charge(&mut self, delta_kwh: f64, price_sek_per_kwh: f64) {
        debug_assert!(delta_kwh > 0.0);
        self.stored_kwh += delta_kwh;
        self.total_cost_sek += delta_kwh * price_sek_per_kwh;
    }

    /// Apply a discharge event of `delta_kwh` (> 0, energy *removed*). WAC is
    /// preserved: cost shrinks in proportion to the energy removed.
    pub fn apply_discharge(&mut self, delta_kwh: f64) {
        debug_assert!(delta_kwh > 0.0);
        if self.stored_kwh <= 0.0 {
            self.stored_kwh = 0.0;
            self.total_cost_sek = 0.0;
            return;
        }
        let new_stored = (self.stored_kwh - delta_kwh).max(0.0);
        self.total_cost_sek *= new_stored / self.stored_kwh;
        self.stored_kwh = new_stored;
    }
}
