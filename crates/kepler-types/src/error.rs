// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The error taxonomy from spec.md §7, shared by every crate so that
//! `kepler-adapters` and `kepler-core` can convert into (and match on) the
//! same variants the Scheduler and Executor reason about.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeplerError {
    /// Config violates an invariant (e.g. `min_soc > max_soc`). Fatal at
    /// startup; the caller must not start any task.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Upstream forecast/price provider returned no data or partial data.
    #[error("forecast unavailable: {0}")]
    ForecastUnavailable(String),

    /// Inputs violate the Planner's preconditions (e.g. `min_soc > max_soc`);
    /// solving was never attempted.
    #[error("invalid planner input: {0}")]
    InvalidInput(String),

    /// The MILP has no feasible solution under the current constraints.
    #[error("solver found the model infeasible: {0}")]
    SolverInfeasible(String),

    /// The solver hit its time limit with a MIP gap that was too wide to
    /// accept the incumbent.
    #[error("solver timed out before reaching an acceptable gap: {0}")]
    SolverTimeout(String),

    /// Persistence failure. Transient failures are retried by the caller
    /// with exponential backoff before this variant is surfaced.
    #[error("store I/O failure: {0}")]
    StoreIO(String),

    /// A single actuator command failed to reach the device at all (network,
    /// timeout). Logged; never fatal to an Executor tick.
    #[error("actuator unreachable: {0}")]
    ActuatorUnreachable(String),

    /// The actuator reached the device but it rejected the command.
    #[error("actuator rejected command: {0}")]
    ActuatorRejected(String),
}

impl KeplerError {
    /// Whether the Scheduler should retry the same plan cycle on its next
    /// tick rather than surface a persistent `last_error`.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KeplerError::ForecastUnavailable(_)
                | KeplerError::SolverTimeout(_)
                | KeplerError::StoreIO(_)
        )
    }
}
