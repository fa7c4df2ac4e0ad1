// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Durable state: schedule slots, execution log, battery cost, vacation
//! state. The Store owns durability and exposes transactional upserts;
//! callers decide retry vs. propagation on I/O failure (spec.md §4.A).

mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, NaiveDate, Utc};
use kepler_types::{ExecutionRecord, LedgerRecord, PlannedSlot, Schedule, ScheduleMeta, VacationState};

/// The single source of truth for everything the Scheduler and Executor
/// persist. Implementations must make `save_schedule` all-or-nothing under
/// crash and must serialize concurrent multi-table transactions (spec.md
/// §4.A's "shared lock across the process").
pub trait Store: Send + Sync {
    /// Atomic write of the entire schedule and metadata. Overwrites any
    /// prior schedule; on success the previous schedule is no longer
    /// readable.
    fn save_schedule(&self, meta: &ScheduleMeta, slots: &[PlannedSlot]) -> Result<(), StoreError>;

    /// The most recently saved schedule, if any.
    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError>;

    /// The slot whose interval contains `timestamp`, if a schedule exists
    /// and covers that instant.
    fn get_slot_for(&self, timestamp: DateTime<Utc>) -> Result<Option<PlannedSlot>, StoreError>;

    /// Strictly append-only.
    fn append_execution_record(&self, record: &ExecutionRecord) -> Result<(), StoreError>;

    /// Most-recent-first.
    fn read_recent_execution(&self, limit: usize) -> Result<Vec<ExecutionRecord>, StoreError>;

    /// Overwrites the single ledger record.
    fn upsert_battery_cost(&self, stored_kwh: f64, total_cost_sek: f64) -> Result<(), StoreError>;

    fn read_battery_cost(&self) -> Result<LedgerRecord, StoreError>;

    /// Slots from the execution log shaped as planned slots, for merging
    /// historical context into freshly generated schedules (spec.md §4.C
    /// "Historical merge").
    fn get_historical_executed_slots(&self, date: NaiveDate) -> Result<Vec<PlannedSlot>, StoreError>;

    /// Application state for vacation mode (spec.md §3), distinct from the
    /// static `vacation` config table: defaults to disabled if never set.
    fn read_vacation_state(&self) -> Result<VacationState, StoreError>;

    /// Overwrites the single vacation-state row.
    fn write_vacation_state(&self, state: &VacationState) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failure: {0}")]
    Io(String),
}

impl From<StoreError> for kepler_types::KeplerError {
    fn from(err: StoreError) -> Self {
        kepler_types::KeplerError::StoreIO(err.to_string())
    }
}

/// Retry a fallible Store operation with the backoff schedule from spec.md
/// §7: 50ms → 1s, max 5 attempts, terminal after that.
pub fn with_retry<T>(mut op: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
    let delays_ms = [50, 100, 200, 500, 1000];
    let mut last_err = None;
    for delay_ms in delays_ms {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(error = %err, delay_ms, "store operation failed, retrying");
                last_err = Some(err);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
            }
        }
    }
    op().map_err(|err| {
        tracing::error!(error = %err, "store operation failed after max retries");
        last_err.unwrap_or(err)
    })
}

#[cfg(test)]
mod retry_tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn retries_until_success() {
        let attempts = Cell::new(0);
        let result = with_retry(|| {
            let n = attempts.get() + 1;
            attempts.set(n);
            if n < 3 {
                Err(StoreError::Io("transient".to_string()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let result: Result<(), StoreError> = with_retry(|| Err(StoreError::Io("down".to_string())));
        assert!(result.is_err());
    }
}
