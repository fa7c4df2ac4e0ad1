// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The `bevy_app::Plugin` that hosts the Scheduler and Executor as `Update`
//! systems (SPEC_FULL.md §2 AMBIENT Runtime model). Mirrors the teacher's
//! `continuous_systems.rs`: a 1-tokio-task-per-cycle async body, bridged
//! back into the ECS thread over a `crossbeam_channel` rather than awaited
//! directly in a system (systems must not block).

use std::time::{Duration, Instant};

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, unbounded};
use kepler_types::{ExecutionRecord, KeplerError};

use crate::events::ScheduleUpdated;
use crate::executor::{ExecutorState, ExecutorTickDeps, run_executor_tick};
use crate::resources::{ActuatorResource, ConfigResource, ExecutorStateResource, ForecastProviderResource, StoreResource};
use crate::scheduler::{self, PlanCycleDeps, SchedulerState, should_run_plan_cycle, stamp_last_error};

/// Result of one completed plan cycle, sent from the `tokio` task back to
/// the `Update` system over `crossbeam_channel`.
enum SchedulerOutcome {
    Planned(chrono::DateTime<Utc>),
    Failed(KeplerError),
}

#[derive(Resource)]
struct SchedulerChannel {
    sender: Sender<SchedulerOutcome>,
    receiver: Receiver<SchedulerOutcome>,
}

impl Default for SchedulerChannel {
    fn default() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

/// Rate-limits the once-per-second `Update` system down to the 1-minute
/// catch-up check SPEC_FULL.md §4.D calls for.
#[derive(Resource)]
struct SchedulerCheckTimer {
    last_checked: Option<Instant>,
}

impl Default for SchedulerCheckTimer {
    fn default() -> Self {
        Self { last_checked: None }
    }
}

const CATCH_UP_CHECK_INTERVAL: Duration = Duration::from_secs(60);

enum ExecutorOutcome {
    Ticked(ExecutionRecord),
    Failed(KeplerError),
}

#[derive(Resource)]
struct ExecutorChannel {
    sender: Sender<ExecutorOutcome>,
    receiver: Receiver<ExecutorOutcome>,
}

impl Default for ExecutorChannel {
    fn default() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

#[derive(Resource)]
struct ExecutorCheckTimer {
    last_checked: Option<Instant>,
}

impl Default for ExecutorCheckTimer {
    fn default() -> Self {
        Self { last_checked: None }
    }
}

/// Adds the Scheduler/Executor `Update` systems to a `bevy_app::App`.
/// `kepler-main` inserts [`ConfigResource`]/[`StoreResource`]/
/// [`ActuatorResource`]/[`ForecastProviderResource`]/the `Solver` before
/// adding this plugin.
pub struct KeplerCorePlugin {
    pub planner_version: String,
}

impl Plugin for KeplerCorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SchedulerState::default())
            .insert_resource(SchedulerChannel::default())
            .insert_resource(SchedulerCheckTimer::default())
            .insert_resource(ExecutorStateResource(std::sync::Arc::new(std::sync::Mutex::new(
                ExecutorState::default(),
            ))))
            .insert_resource(ExecutorChannel::default())
            .insert_resource(ExecutorCheckTimer::default())
            .insert_resource(PlannerVersion(self.planner_version.clone()))
            .add_systems(Update, (scheduler_tick_system, poll_scheduler_results_system))
            .add_systems(Update, (executor_tick_system, poll_executor_results_system));
    }
}

#[derive(Resource, Clone)]
struct PlannerVersion(String);

/// Checks, at most once a minute, whether a trigger has elapsed since the
/// last successful plan, and if so spawns a plan cycle. Coalesces a trigger
/// that fires while a cycle is already in flight (P5).
fn scheduler_tick_system(
    mut timer: ResMut<SchedulerCheckTimer>,
    mut state: ResMut<SchedulerState>,
    channel: Res<SchedulerChannel>,
    config: Res<ConfigResource>,
    store: Res<StoreResource>,
    actuator: Res<ActuatorResource>,
    forecast_provider: Res<ForecastProviderResource>,
    version: Res<PlannerVersion>,
) {
    let now_instant = Instant::now();
    if let Some(last) = timer.last_checked
        && now_instant.duration_since(last) < CATCH_UP_CHECK_INTERVAL
    {
        return;
    }
    timer.last_checked = Some(now_instant);

    let now = Utc::now();
    let Ok(trigger_times) = scheduler::parse_trigger_times(&config.0.scheduler.trigger_times_local) else {
        tracing::error!("scheduler.trigger_times_local is unparsable; skipping catch-up check");
        return;
    };
    let last_planned_at_local = state.last_planned_at.map(|dt| dt.naive_local());
    if !should_run_plan_cycle(now.naive_local(), &trigger_times, last_planned_at_local) {
        return;
    }
    if !state.begin_cycle() {
        return;
    }

    let deps = PlanCycleDeps {
        config: config.0.clone(),
        store: store.clone(),
        actuator: actuator.clone(),
        forecast_provider: forecast_provider.clone(),
        solver: std::sync::Arc::new(crate::kepler::HighsSolver::with_config(&config.0.kepler_solver)),
        planner_version: version.0.clone(),
    };
    let sender = channel.sender.clone();
    let jitter = scheduler::jitter_delay(config.0.scheduler.jitter_seconds);

    tokio::spawn(async move {
        tokio::time::sleep(jitter).await;
        let result = scheduler::run_plan_cycle(deps, Utc::now()).await;
        let outcome = match result {
            Ok(planned_at) => SchedulerOutcome::Planned(planned_at),
            Err(err) => SchedulerOutcome::Failed(err),
        };
        let _ = sender.send(outcome);
    });
}

/// Drains completed plan-cycle results and updates [`SchedulerState`],
/// firing [`ScheduleUpdated`] on success (spec.md §4.D).
fn poll_scheduler_results_system(
    mut commands: Commands,
    channel: Res<SchedulerChannel>,
    mut state: ResMut<SchedulerState>,
    store: Res<StoreResource>,
) {
    while let Ok(outcome) = channel.receiver.try_recv() {
        let rerun = match outcome {
            SchedulerOutcome::Planned(planned_at) => {
                let rerun = state.end_cycle(&Ok(planned_at));
                if let Ok(Some(schedule)) = store.0.load_schedule() {
                    commands.trigger(ScheduleUpdated {
                        planned_at,
                        horizon_start: schedule.meta.horizon_start,
                        horizon_end: schedule.meta.horizon_end,
                        slot_count: schedule.slots.len(),
                    });
                }
                rerun
            }
            SchedulerOutcome::Failed(err) => {
                tracing::error!(error = %err, "plan cycle failed");
                stamp_last_error(store.0.as_ref(), &err, Utc::now());
                state.end_cycle(&Err(err))
            }
        };

        if rerun {
            // A trigger fired mid-cycle; the next tick's catch-up check will
            // immediately see `last_planned_at` as stale and re-fire.
            tracing::info!("coalesced rerun requested; next scheduler tick will replan");
        }
    }
}

fn executor_tick_system(
    mut timer: ResMut<ExecutorCheckTimer>,
    channel: Res<ExecutorChannel>,
    config: Res<ConfigResource>,
    store: Res<StoreResource>,
    actuator: Res<ActuatorResource>,
    state: Res<ExecutorStateResource>,
) {
    let now_instant = Instant::now();
    let cooldown = Duration::from_secs(config.0.executor.tick_seconds);
    if let Some(last) = timer.last_checked
        && now_instant.duration_since(last) < cooldown
    {
        return;
    }
    timer.last_checked = Some(now_instant);

    let deps = ExecutorTickDeps {
        config: config.0.clone(),
        store: store.0.clone(),
        actuator: actuator.0.clone(),
        state: state.0.clone(),
    };
    let sender = channel.sender.clone();
    tokio::spawn(async move {
        let outcome = match run_executor_tick(deps, Utc::now()).await {
            Ok(record) => ExecutorOutcome::Ticked(record),
            Err(err) => ExecutorOutcome::Failed(err),
        };
        let _ = sender.send(outcome);
    });
}

/// `run_executor_tick` already updates [`ExecutorState`] (shared through
/// [`ExecutorStateResource`]) before sending its result over the channel;
/// this system only needs to surface failures.
fn poll_executor_results_system(channel: Res<ExecutorChannel>) {
    while let Ok(outcome) = channel.receiver.try_recv() {
        match outcome {
            ExecutorOutcome::Ticked(record) => {
                if !record.result.is_success() {
                    tracing::warn!(reason = ?record.result, "executor tick completed with a failure");
                }
            }
            ExecutorOutcome::Failed(err) => {
                tracing::error!(error = %err, "executor tick aborted");
            }
        }
    }
}
