// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Entry points and exit codes (spec.md §6).

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kepler", version, about = "Residential energy management: Planner, Scheduler, Executor")]
pub struct Cli {
    #[arg(long, default_value = "kepler.toml")]
    pub config: String,

    #[arg(long, default_value = "kepler.sqlite3")]
    pub db: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one Planner cycle and exit.
    PlanOnce,
    /// Run one Executor tick and exit.
    ExecuteTick,
    /// Run the Scheduler and Executor continuously until signaled.
    Daemon,
}

/// Process exit codes, spec.md §6: 0 success, 2 infeasible, 3 I/O error, 4
/// config error.
#[must_use]
pub fn exit_code_for(err: &kepler_types::KeplerError) -> i32 {
    match err {
        kepler_types::KeplerError::ConfigInvalid(_) => 4,
        kepler_types::KeplerError::SolverInfeasible(_) => 2,
        kepler_types::KeplerError::StoreIO(_) => 3,
        _ => 3,
    }
}
