// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which safety override, if any, fired for an Executor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideType {
    None,
    LowSoC,
    ExcessPv,
    NotifyOnly,
    ManualPause,
}

/// Outcome of an Executor tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionResult {
    Success,
    Failed { reason: String },
}

impl ExecutionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success)
    }
}

/// One append-only record of everything an Executor tick decided and did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub slot_start_time: DateTime<Utc>,
    pub soc_before_percent: f64,
    pub work_mode: String,
    pub charge_current_a: f64,
    pub water_temp_c: f64,
    pub soc_target_percent: f64,
    pub override_type: OverrideType,
    pub result: ExecutionResult,
    pub latency_ms: u64,
}

impl ExecutionRecord {
    /// Invariant I5: no record is more than one tick interval earlier than
    /// the slot it claims to act on.
    #[must_use]
    pub fn within_tick_tolerance(&self, tick_interval_secs: i64) -> bool {
        (self.slot_start_time - self.timestamp).num_seconds() <= tick_interval_secs
    }
}
