// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Binary entry point (spec.md §6): `plan-once` / `execute-tick` run one
//! cycle and exit; `daemon` hosts the Scheduler and Executor as `bevy_ecs`
//! systems until signaled. Follows the teacher's `fluxion-main::main`
//! shape: a dedicated multi-thread `tokio` runtime, with the `bevy_app`
//! itself driven from a `spawn_blocking` task so `App::run()`'s blocking
//! loop doesn't starve the async reactor.

mod cli;
mod config;

use std::process::exit;
use std::sync::Arc;

use anyhow::Context;
use bevy_app::prelude::*;
use clap::Parser;
use chrono::Utc;
use kepler_adapters::{HaActuator, HaConfig, HaForecastProvider};
use kepler_core::executor::{ExecutorState, ExecutorTickDeps, run_executor_tick};
use kepler_core::kepler::HighsSolver;
use kepler_core::resources::{ActuatorResource, ConfigResource, ForecastProviderResource, StoreResource};
use kepler_core::scheduler::{PlanCycleDeps, run_plan_cycle};
use kepler_core::store::SqliteStore;
use kepler_core::{KeplerCorePlugin, Store};
use kepler_types::SystemConfig;

use cli::{Cli, Command, exit_code_for};

const PLANNER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    match cli.command {
        Command::Daemon => runtime.block_on(async { tokio::task::spawn_blocking(move || run_daemon(cli)).await })
            .context("daemon task panicked")?,
        Command::PlanOnce => runtime.block_on(run_plan_once(cli)),
        Command::ExecuteTick => runtime.block_on(run_execute_tick(cli)),
    }
}

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default tracing subscriber failed");
}

fn open_store(cli: &Cli) -> anyhow::Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(&cli.db).map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(Arc::new(store))
}

fn build_actuator_and_forecast() -> anyhow::Result<(Arc<HaActuator>, Arc<HaForecastProvider>)> {
    let ha_config = HaConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    let actuator = Arc::new(HaActuator::new(ha_config.clone()));
    let forecast_provider = Arc::new(HaForecastProvider::new(ha_config));
    Ok((actuator, forecast_provider))
}

async fn run_plan_once(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(&cli.config).map_err(|e| anyhow::anyhow!("{e}"));
    let config = match config {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            exit(4);
        }
    };
    let store = match open_store(&cli) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "store open failed");
            exit(3);
        }
    };
    let (actuator, forecast_provider) = match build_actuator_and_forecast() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "actuator/forecast setup failed");
            exit(4);
        }
    };

    let deps = PlanCycleDeps {
        config: config.clone(),
        store: StoreResource(store as Arc<dyn Store>),
        actuator: ActuatorResource(actuator),
        forecast_provider: ForecastProviderResource(forecast_provider),
        solver: Arc::new(HighsSolver::with_config(&config.kepler_solver)),
        planner_version: PLANNER_VERSION.to_string(),
    };

    match run_plan_cycle(deps, Utc::now()).await {
        Ok(planned_at) => {
            tracing::info!(%planned_at, "plan cycle complete");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "plan cycle failed");
            exit(exit_code_for(&err));
        }
    }
}

async fn run_execute_tick(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(&cli.config).map_err(|e| anyhow::anyhow!("{e}"));
    let config = match config {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            exit(4);
        }
    };
    let store = match open_store(&cli) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "store open failed");
            exit(3);
        }
    };
    let (actuator, _forecast_provider) = match build_actuator_and_forecast() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "actuator setup failed");
            exit(4);
        }
    };

    // A one-shot `execute-tick` invocation has no previous process to carry
    // `ExecutorState` from, so the very first ledger update after each
    // invocation has no baseline to diff against and books nothing (see
    // `run_executor_tick`'s doc comment); the `daemon` subcommand is the
    // supported way to run the Executor continuously.
    let deps = ExecutorTickDeps {
        config,
        store: store as Arc<dyn Store>,
        actuator,
        state: Arc::new(std::sync::Mutex::new(ExecutorState::default())),
    };

    match run_executor_tick(deps, Utc::now()).await {
        Ok(record) => {
            tracing::info!(result = ?record.result, "executor tick complete");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "executor tick aborted");
            exit(exit_code_for(&err));
        }
    }
}

fn run_daemon(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(&cli.config).map_err(|e| anyhow::anyhow!("{e}"));
    let config = match config {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            exit(4);
        }
    };
    let store = match open_store(&cli) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "store open failed");
            exit(3);
        }
    };
    let (actuator, forecast_provider) = match build_actuator_and_forecast() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "actuator/forecast setup failed");
            exit(4);
        }
    };

    tracing::info!(db = %cli.db, config = %cli.config, "starting Kepler daemon");

    let mut app = App::new();
    app.add_plugins(TaskPoolPlugin::default())
        .add_plugins(ScheduleRunnerPlugin::run_loop(std::time::Duration::from_secs(1)))
        .insert_resource(ConfigResource(config))
        .insert_resource(StoreResource(store as Arc<dyn Store>))
        .insert_resource(ActuatorResource(actuator))
        .insert_resource(ForecastProviderResource(forecast_provider))
        .add_plugins(KeplerCorePlugin {
            planner_version: PLANNER_VERSION.to_string(),
        });

    app.run();
    Ok(())
}
