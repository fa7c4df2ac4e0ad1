// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Shared data model for the Kepler residential energy management system.
//!
//! This crate has no async/runtime dependencies of its own: it is the
//! vocabulary that `kepler-core`, `kepler-adapters` and `kepler-main` all
//! speak, so that none of them needs to depend on the others for types.

pub mod battery;
pub mod config;
pub mod error;
pub mod execution;
pub mod forecast;
pub mod ledger;
pub mod rounding;
pub mod schedule;
pub mod slot;
pub mod vacation;

pub use battery::BatteryState;
pub use config::SystemConfig;
pub use error::KeplerError;
pub use execution::{ExecutionRecord, ExecutionResult, OverrideType};
pub use forecast::ForecastPoint;
pub use ledger::LedgerRecord;
pub use rounding::round2;
pub use schedule::{Classification, PlannedSlot, Schedule, ScheduleMeta};
pub use slot::{SLOT_MINUTES, Slot};
pub use vacation::VacationState;
