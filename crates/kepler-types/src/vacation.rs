// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Application state (not config) for vacation mode: set by a user action,
/// cleared automatically once `end_date` passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VacationState {
    pub enabled: bool,
    pub end_date: Option<NaiveDate>,
    pub last_anti_legionella_at: Option<DateTime<Utc>>,
}

impl Default for VacationState {
    fn default() -> Self {
        Self {
            enabled: false,
            end_date: None,
            last_anti_legionella_at: None,
        }
    }
}

impl VacationState {
    /// Apply the auto-clear lifecycle rule: once `end_date` is in the past
    /// relative to `today`, vacation mode switches itself off.
    #[must_use]
    pub fn expire_if_past(mut self, today: NaiveDate) -> Self {
        if self.enabled
            && let Some(end_date) = self.end_date
            && end_date < today
        {
            self.enabled = false;
            self.end_date = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_end_date() {
        let state = VacationState {
            enabled: true,
            end_date: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            last_anti_legionella_at: None,
        };
        let expired = state.expire_if_past(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert!(!expired.enabled);
        assert!(expired.end_date.is_none());
    }

    #[test]
    fn stays_enabled_before_end_date() {
        let state = VacationState {
            enabled: true,
            end_date: Some(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
            last_anti_legionella_at: None,
        };
        let still = state.expire_if_past(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert!(still.enabled);
    }
}
