// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The Scheduler (spec.md §4.D): owns the temporal cadence of planning.
//! Catch-up logic is a pure function of "now" + "last planned_at" + the
//! trigger descriptor so it is unit-testable in isolation (SPEC_FULL.md §8,
//! P5/S3). The plan cycle itself is async glue wired into a `bevy_ecs`
//! `Update` system in [`crate::kepler`]'s host binary, following the
//! teacher's `continuous_systems.rs` fast-tick-wraps-slow-cooldown pattern.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, NaiveTime, Utc};
use kepler_types::{KeplerError, SLOT_MINUTES, SystemConfig};
use rand::Rng;

use crate::kepler::{ExportInput, PlannerRequest, Solver, WaterHeaterInput, plan};
use crate::resources::{ActuatorResource, ForecastProviderResource, SensorId, StoreResource};

/// Vacation mode's anti-legionella quota: how many of the horizon's earliest
/// slots to force water-heating on, given the configured target duration
/// (spec.md §3/§4.C.5-6). Returns the slot indices to pass as
/// [`WaterHeaterInput::forced_on_slots`].
#[must_use]
fn anti_legionella_slots(hours: f64) -> Vec<usize> {
    if hours <= 0.0 {
        return Vec::new();
    }
    let slot_hours = SLOT_MINUTES as f64 / 60.0;
    let slots_needed = (hours / slot_hours).ceil() as usize;
    (0..slots_needed).collect()
}

/// Parse spec.md §6's `scheduler.trigger_times_local` (`"HH:MM"` strings)
/// into sorted `NaiveTime`s. Fails `ConfigInvalid` on an unparsable entry
/// rather than silently dropping it.
pub fn parse_trigger_times(raw: &[String]) -> Result<Vec<NaiveTime>, KeplerError> {
    let mut times = raw
        .iter()
        .map(|s| {
            NaiveTime::parse_from_str(s, "%H:%M")
                .map_err(|e| KeplerError::ConfigInvalid(format!("bad trigger time '{s}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    times.sort();
    Ok(times)
}

/// The most recent scheduled trigger time that is `<= now_local`. If no
/// trigger has fired yet today, falls back to the latest trigger of the
/// previous day.
#[must_use]
pub fn most_recent_trigger(now_local: NaiveDateTime, trigger_times: &[NaiveTime]) -> Option<NaiveDateTime> {
    let latest_time = *trigger_times.iter().max()?;
    let today = now_local.date();
    let todays: Vec<NaiveDateTime> = trigger_times
        .iter()
        .map(|t| NaiveDateTime::new(today, *t))
        .filter(|dt| *dt <= now_local)
        .collect();
    todays
        .into_iter()
        .max()
        .or_else(|| Some(NaiveDateTime::new(today - ChronoDuration::days(1), latest_time)))
}

/// Catch-up decision (spec.md §4.D): run a plan cycle now if the last
/// successful plan's `planned_at` predates the most recent trigger that has
/// already elapsed. Exactly one cycle runs per missed trigger, never one per
/// tick (P5/S3).
#[must_use]
pub fn should_run_plan_cycle(
    now_local: NaiveDateTime,
    trigger_times: &[NaiveTime],
    last_planned_at_local: Option<NaiveDateTime>,
) -> bool {
    let Some(trigger) = most_recent_trigger(now_local, trigger_times) else {
        return false;
    };
    match last_planned_at_local {
        Some(last) => last < trigger,
        None => true,
    }
}

/// Random 0–`max_seconds` jitter (spec.md §4.D), sampled fresh per call so
/// repeated triggers don't phase-lock against a shared upstream API.
#[must_use]
pub fn jitter_delay(max_seconds: u32) -> std::time::Duration {
    if max_seconds == 0 {
        return std::time::Duration::ZERO;
    }
    let secs = rand::rng().random_range(0..=max_seconds);
    std::time::Duration::from_secs(u64::from(secs))
}

/// Tracks the Scheduler's cadence state across ticks. One instance per
/// process; mutated only by the tick system (spec.md §5: "not reentrant").
#[derive(Resource, Debug, Clone, Default)]
pub struct SchedulerState {
    pub last_planned_at: Option<DateTime<Utc>>,
    /// A plan cycle is currently in flight. A trigger arriving while this is
    /// true coalesces into `rerun_requested` rather than spawning a second
    /// cycle (spec.md §4.D concurrency note).
    pub in_flight: bool,
    pub rerun_requested: bool,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

impl SchedulerState {
    /// Called by the tick system when a trigger fires. Returns whether the
    /// caller should actually spawn a cycle now.
    pub fn begin_cycle(&mut self) -> bool {
        if self.in_flight {
            self.rerun_requested = true;
            false
        } else {
            self.in_flight = true;
            true
        }
    }

    /// Called when a cycle finishes. Returns true if a coalesced rerun
    /// should be spawned immediately.
    pub fn end_cycle(&mut self, result: &Result<DateTime<Utc>, KeplerError>) -> bool {
        self.in_flight = false;
        match result {
            Ok(planned_at) => {
                self.last_planned_at = Some(*planned_at);
                self.last_error = None;
                self.last_error_at = None;
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                self.last_error_at = Some(Utc::now());
            }
        }
        std::mem::take(&mut self.rerun_requested)
    }
}

/// Everything a single plan cycle needs, bundled so the async body in
/// [`run_plan_cycle`] takes one argument instead of five.
#[derive(Clone)]
pub struct PlanCycleDeps {
    pub config: Arc<SystemConfig>,
    pub store: StoreResource,
    pub actuator: ActuatorResource,
    pub forecast_provider: ForecastProviderResource,
    pub solver: Arc<dyn Solver>,
    pub planner_version: String,
}

/// Run one plan cycle end to end (spec.md §4.D steps 1–5). The MILP solve
/// itself is dispatched to `spawn_blocking` so it never blocks the async
/// reactor (spec.md §5); everything else here is `.await`ed I/O.
pub async fn run_plan_cycle(deps: PlanCycleDeps, now: DateTime<Utc>) -> Result<DateTime<Utc>, KeplerError> {
    let horizon_start = kepler_types::Slot::floor(now);
    let horizon_slots = deps.config.horizon.slot_count();
    let horizon_end = horizon_start + ChronoDuration::minutes(SLOT_MINUTES * horizon_slots as i64);

    // Step 1: forecast + prices, truncated to best-available if incomplete.
    let forecast = deps
        .forecast_provider
        .0
        .get_forecast(horizon_start, horizon_end)
        .await?;
    if forecast.is_empty() {
        return Err(KeplerError::ForecastUnavailable(
            "forecast provider returned no slots for the horizon".to_string(),
        ));
    }

    // Step 2: current SoC from the actuator.
    let current_soc_percent = deps
        .actuator
        .0
        .get_sensor(SensorId::BatterySocPercent)
        .await?
        .ok_or_else(|| KeplerError::ActuatorUnreachable("battery SoC sensor unavailable".to_string()))?;

    let battery = kepler_types::BatteryState {
        capacity_kwh: deps.config.battery.capacity_kwh,
        min_soc_percent: deps.config.battery.min_soc_percent,
        max_soc_percent: deps.config.battery.max_soc_percent,
        max_charge_kw: deps.config.battery.max_charge_kw,
        max_discharge_kw: deps.config.battery.max_discharge_kw,
        roundtrip_efficiency: deps.config.battery.roundtrip_efficiency,
        current_soc_percent,
    };

    // Vacation is application state (SPEC_FULL.md §2 AMBIENT Configuration),
    // not config; `config.vacation.enabled` is a static "always on" override
    // on top of the Store-backed toggle a user flips at runtime.
    let vacation = deps
        .store
        .0
        .read_vacation_state()
        .map_err(KeplerError::from)?
        .expire_if_past(now.date_naive());
    deps.store.0.write_vacation_state(&vacation).map_err(KeplerError::from)?;
    let vacation_active = vacation.enabled || deps.config.vacation.enabled;

    let anti_legionella_due = vacation_active
        && deps.config.vacation.anti_legionella_interval_days > 0
        && vacation.last_anti_legionella_at.is_none_or(|last| {
            now - last >= ChronoDuration::days(i64::from(deps.config.vacation.anti_legionella_interval_days))
        });
    let forced_on_slots = if anti_legionella_due {
        anti_legionella_slots(deps.config.vacation.anti_legionella_hours)
    } else {
        Vec::new()
    };

    let water_heater = deps.config.water_heater.enabled.then(|| WaterHeaterInput {
        power_kw: deps.config.water_heater.power_kw,
        min_kwh_per_day: if vacation_active {
            0.0
        } else {
            deps.config.water_heater.min_kwh_per_day
        },
        max_hours_between_heating: deps.config.water_heater.max_hours_between_heating,
        already_heated_today_kwh: 0.0,
        comfort_penalty_sek_per_hour_over_gap: deps.config.water_heater.comfort_penalty_sek_per_hour,
        hard_gap_enforcement: deps.config.water_heater.hard_gap_enforcement,
        forced_on_slots,
    });

    let request = PlannerRequest {
        now,
        horizon_start,
        forecast,
        battery,
        water_heater,
        export: ExportInput {
            enabled: deps.config.export.enabled,
            max_export_kw: deps.config.export.max_export_kw,
        },
        wear_cost_sek_per_kwh: deps.config.kepler_solver.wear_cost_sek_per_kwh,
        ramping_cost_sek_per_kw: deps.config.kepler_solver.ramping_cost_sek_per_kw,
        planner_version: deps.planner_version.clone(),
    };

    // Step 3: solve off the async reactor; CPU-bound by design (spec.md §5).
    let store_for_solve = deps.store.clone();
    let solver = deps.solver.clone();
    let response = tokio::task::spawn_blocking(move || plan(&request, store_for_solve.0.as_ref(), solver.as_ref()))
        .await
        .map_err(|e| KeplerError::StoreIO(format!("plan cycle task panicked: {e}")))??;

    // Step 4: persist atomically.
    crate::store::with_retry(|| {
        deps.store
            .0
            .save_schedule(&response.meta, &response.slots)
            .map_err(std::convert::Into::into)
    })
    .map_err(KeplerError::from)?;

    if anti_legionella_due {
        let mut vacation = vacation;
        vacation.last_anti_legionella_at = Some(now);
        if let Err(e) = deps.store.0.write_vacation_state(&vacation) {
            tracing::error!(error = %e, "failed to stamp anti-legionella cycle timestamp");
        }
    }

    Ok(response.meta.planned_at)
}

/// On any plan cycle failure, stamp `last_error`/`last_error_at` onto the
/// existing schedule metadata without disturbing its slots, so the Executor
/// keeps acting on the last known good schedule (spec.md §7 user-visible
/// failure behavior) while the dashboard surfaces the failure banner.
pub fn stamp_last_error(store: &dyn crate::store::Store, error: &KeplerError, at: DateTime<Utc>) {
    let Ok(Some(mut schedule)) = store.load_schedule() else {
        return;
    };
    schedule.meta.last_error = Some(error.to_string());
    schedule.meta.last_error_at = Some(at);
    if let Err(e) = store.save_schedule(&schedule.meta, &schedule.slots) {
        tracing::error!(error = %e, "failed to persist last_error onto existing schedule");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn triggers(times: &[&str]) -> Vec<NaiveTime> {
        parse_trigger_times(&times.iter().map(|s| (*s).to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn parses_and_sorts_trigger_times() {
        let times = triggers(&["18:05", "00:05", "06:05", "12:05"]);
        assert_eq!(times[0], NaiveTime::from_hms_opt(0, 5, 0).unwrap());
        assert_eq!(times.last().unwrap(), &NaiveTime::from_hms_opt(18, 5, 0).unwrap());
    }

    #[test]
    fn rejects_unparsable_trigger_time() {
        let result = parse_trigger_times(&["not-a-time".to_string()]);
        assert!(matches!(result, Err(KeplerError::ConfigInvalid(_))));
    }

    /// S3: offline 14:00–18:30 with hourly :05 triggers. At 18:30, the most
    /// recent elapsed trigger is 18:05; catch-up should fire exactly once.
    #[test]
    fn scenario_s3_catch_up_after_outage() {
        let hourly: Vec<NaiveTime> = (0..24).map(|h| NaiveTime::from_hms_opt(h, 5, 0).unwrap()).collect();
        let last_planned = dt(13, 5); // last successful plan before the outage
        let now = dt(18, 30);

        assert_eq!(most_recent_trigger(now, &hourly), Some(dt(18, 5)));
        assert!(should_run_plan_cycle(now, &hourly, Some(last_planned)));

        // Once the catch-up plan lands at 18:30 with planned_at = 18:05 trigger's
        // cycle, the 19:05 trigger hasn't elapsed yet, so no cycle runs at 18:31.
        let after_catchup = Some(dt(18, 5));
        assert!(!should_run_plan_cycle(dt(18, 31), &hourly, after_catchup));
        // But it does run once 19:05 arrives.
        assert!(should_run_plan_cycle(dt(19, 5), &hourly, after_catchup));
    }

    #[test]
    fn no_trigger_elapsed_yet_today_falls_back_to_yesterday() {
        let single = triggers(&["05:05"]);
        let now = dt(2, 0); // before today's only trigger
        let trigger = most_recent_trigger(now, &single).unwrap();
        assert_eq!(trigger.date(), now.date() - ChronoDuration::days(1));
    }

    #[test]
    fn never_runs_twice_for_the_same_trigger() {
        let single = triggers(&["05:05"]);
        let trigger_time = dt(5, 5);
        assert!(should_run_plan_cycle(trigger_time, &single, Some(dt(4, 0))));
        // After the cycle completes with planned_at == trigger_time, the same
        // trigger must not fire again on a later tick before the next trigger.
        assert!(!should_run_plan_cycle(dt(5, 6), &single, Some(trigger_time)));
    }

    #[test]
    fn missing_last_plan_always_triggers_a_cycle() {
        let single = triggers(&["05:05"]);
        assert!(should_run_plan_cycle(dt(10, 0), &single, None));
    }

    #[test]
    fn begin_cycle_coalesces_concurrent_triggers() {
        let mut state = SchedulerState::default();
        assert!(state.begin_cycle());
        assert!(!state.begin_cycle(), "second trigger while in flight must coalesce");
        assert!(state.rerun_requested);

        let rerun = state.end_cycle(&Ok(Utc::now()));
        assert!(rerun, "a coalesced trigger must cause exactly one follow-up cycle");
        assert!(!state.in_flight);
    }

    #[test]
    fn jitter_never_exceeds_configured_max() {
        for _ in 0..20 {
            let delay = jitter_delay(60);
            assert!(delay.as_secs() <= 60);
        }
    }

    #[test]
    fn anti_legionella_slots_covers_requested_hours() {
        // 15-minute slots, 2 hours -> 8 slots, always the earliest ones.
        let slots = anti_legionella_slots(2.0);
        assert_eq!(slots, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn anti_legionella_slots_rounds_up_a_partial_slot() {
        let slots = anti_legionella_slots(1.1);
        assert_eq!(slots.len(), 5); // 1.1h / 0.25h = 4.4 -> 5 slots
    }

    #[test]
    fn anti_legionella_slots_empty_when_disabled() {
        assert!(anti_legionella_slots(0.0).is_empty());
    }
}
