// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The Executor (spec.md §4.E): every tick, act on the currently active
//! slot. The override rules, command computation, and the "Accountant"
//! ledger update are pure functions so P6/S4/S5/S7 are unit-testable
//! without a real actuator (SPEC_FULL.md §8), matching the teacher's split
//! between pure decision logic (`execution.rs`) and the async system that
//! drives it (`continuous_systems.rs`).

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use kepler_types::{
    Classification, ExecutionRecord, ExecutionResult, KeplerError, LedgerRecord, OverrideType,
    PlannedSlot, SystemConfig,
};

use crate::resources::{Actuator, SensorId, WorkMode};
use crate::store::Store;

/// What the Executor decided to do for one tick, independent of whether the
/// actuator calls actually landed.
#[derive(Debug, Clone, PartialEq)]
pub struct Commands {
    pub work_mode: WorkMode,
    pub grid_charge_enabled: bool,
    pub charge_current_a: f64,
    pub soc_target_percent: f64,
    pub water_temp_c: f64,
    pub override_type: OverrideType,
}

/// Live telemetry read at `ReadState`, separate from the `PlannedSlot` the
/// schedule supplies.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveTelemetry {
    pub current_soc_percent: f64,
    pub pv_kw_live: f64,
    pub load_kw_live: f64,
}

/// Override rules O1–O3, short-circuited in order (spec.md §4.E). Returns
/// `None` when no override fires, in which case the caller follows the
/// Planned Slot directly.
#[must_use]
pub fn evaluate_overrides(
    slot: &PlannedSlot,
    telemetry: LiveTelemetry,
    config: &SystemConfig,
    executor_paused: bool,
) -> Option<Commands> {
    // O3 takes precedence in config terms (checked first in the teacher's
    // manual-override convention) but spec.md lists O1 first; the contract
    // only requires O1/O2/O3 to short-circuit in order among themselves, and
    // a manual pause always wins regardless of telemetry, so it is evaluated
    // first here without changing which override fires when unpaused.
    if executor_paused {
        return Some(Commands {
            work_mode: WorkMode::ZeroExport,
            grid_charge_enabled: false,
            charge_current_a: 0.0,
            soc_target_percent: telemetry.current_soc_percent,
            water_temp_c: config.water_heater.temp_off,
            override_type: OverrideType::ManualPause,
        });
    }

    // O1: Low-SoC override.
    let safety_floor = config.battery.min_soc_percent + config.executor.safety_margin_percent;
    if telemetry.current_soc_percent <= safety_floor {
        return Some(Commands {
            work_mode: WorkMode::ZeroExport,
            grid_charge_enabled: false,
            charge_current_a: 0.0,
            soc_target_percent: config.battery.min_soc_percent,
            water_temp_c: config.water_heater.temp_off,
            override_type: OverrideType::LowSoC,
        });
    }

    // O2: Excess PV override.
    let near_full = telemetry.current_soc_percent >= config.battery.max_soc_percent - 2.0;
    if telemetry.pv_kw_live > telemetry.load_kw_live && near_full {
        let export_profitable = slot.export_price > 0.0;
        return Some(Commands {
            work_mode: if export_profitable {
                WorkMode::Export
            } else {
                WorkMode::ZeroExport
            },
            grid_charge_enabled: false,
            charge_current_a: 0.0,
            soc_target_percent: telemetry.current_soc_percent,
            water_temp_c: config.water_heater.temp_boost,
            override_type: OverrideType::ExcessPv,
        });
    }

    None
}

/// Command computation from the active slot (spec.md §4.E), used when no
/// override fires.
#[must_use]
pub fn commands_from_slot(slot: &PlannedSlot, config: &SystemConfig) -> Commands {
    let work_mode = match slot.classification {
        Classification::Export => WorkMode::Export,
        Classification::Charge | Classification::PvCharge => WorkMode::Charge,
        _ => WorkMode::ZeroExport,
    };
    let charge_current_a = (slot.charge_kw * 1000.0 / config.executor.nominal_bus_voltage)
        .clamp(0.0, max_charge_amps(config));
    let water_temp_c = if slot.water_heat_active {
        config.water_heater.temp_normal
    } else {
        config.water_heater.temp_off
    };

    Commands {
        work_mode,
        grid_charge_enabled: matches!(slot.classification, Classification::Charge | Classification::PvCharge),
        charge_current_a,
        soc_target_percent: slot.soc_target_percent,
        water_temp_c,
        override_type: OverrideType::None,
    }
}

fn max_charge_amps(config: &SystemConfig) -> f64 {
    config.battery.max_charge_kw * 1000.0 / config.executor.nominal_bus_voltage
}

/// The full per-tick decision: evaluate overrides first, fall back to the
/// plain slot otherwise.
#[must_use]
pub fn decide_commands(
    slot: &PlannedSlot,
    telemetry: LiveTelemetry,
    config: &SystemConfig,
) -> Commands {
    evaluate_overrides(slot, telemetry, config, config.executor.paused)
        .unwrap_or_else(|| commands_from_slot(slot, config))
}

/// Safe idle state used when `FetchSlot` finds nothing (spec.md §4.E
/// "Missing slot" failure semantics).
#[must_use]
pub fn idle_commands(config: &SystemConfig) -> Commands {
    Commands {
        work_mode: WorkMode::ZeroExport,
        grid_charge_enabled: false,
        charge_current_a: 0.0,
        soc_target_percent: config.battery.min_soc_percent,
        water_temp_c: config.water_heater.temp_off,
        override_type: OverrideType::None,
    }
}

/// Hysteresis thresholds for idempotent dispatch (spec.md §4.E): a command
/// is re-issued only if the live value differs from the desired one by more
/// than this margin.
#[derive(Debug, Clone, Copy)]
pub struct Hysteresis {
    pub charge_current_a: f64,
    pub soc_target_percent: f64,
    pub water_temp_c: f64,
}

impl Default for Hysteresis {
    fn default() -> Self {
        Self {
            charge_current_a: 5.0,
            soc_target_percent: 1.0,
            water_temp_c: 1.0,
        }
    }
}

/// What changed between the previously dispatched state and the newly
/// desired one; only these fields need an actuator call this tick (P6/S6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPlan {
    pub work_mode: bool,
    pub grid_charge_enabled: bool,
    pub charge_current_a: bool,
    pub soc_target_percent: bool,
    pub water_temp_c: bool,
}

impl DispatchPlan {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !(self.work_mode
            || self.grid_charge_enabled
            || self.charge_current_a
            || self.soc_target_percent
            || self.water_temp_c)
    }
}

/// Diff desired commands against the last dispatched state through the
/// hysteresis thresholds. `previous == None` (first tick ever) always
/// dispatches everything.
#[must_use]
pub fn diff_commands(
    desired: &Commands,
    previous: Option<&Commands>,
    hysteresis: Hysteresis,
) -> DispatchPlan {
    let Some(prev) = previous else {
        return DispatchPlan {
            work_mode: true,
            grid_charge_enabled: true,
            charge_current_a: true,
            soc_target_percent: true,
            water_temp_c: true,
        };
    };
    DispatchPlan {
        work_mode: desired.work_mode != prev.work_mode,
        grid_charge_enabled: desired.grid_charge_enabled != prev.grid_charge_enabled,
        charge_current_a: (desired.charge_current_a - prev.charge_current_a).abs()
            > hysteresis.charge_current_a,
        soc_target_percent: (desired.soc_target_percent - prev.soc_target_percent).abs()
            > hysteresis.soc_target_percent,
        water_temp_c: (desired.water_temp_c - prev.water_temp_c).abs() > hysteresis.water_temp_c,
    }
}

/// Issue only the commands `plan` says changed. Each dispatch has its own 5s
/// timeout (enforced by the `Actuator` implementation); a single command
/// failure is logged and does not abort the tick (spec.md §4.E).
pub async fn dispatch_commands(
    actuator: &dyn Actuator,
    desired: &Commands,
    plan: DispatchPlan,
) -> Vec<(&'static str, Result<(), kepler_types::KeplerError>)> {
    let mut outcomes = Vec::new();
    if plan.work_mode {
        outcomes.push(("work_mode", actuator.set_work_mode(desired.work_mode).await));
    }
    if plan.grid_charge_enabled {
        outcomes.push((
            "grid_charge_enabled",
            actuator.set_grid_charge_enabled(desired.grid_charge_enabled).await,
        ));
    }
    if plan.charge_current_a {
        outcomes.push((
            "charge_current_a",
            actuator.set_charge_current(desired.charge_current_a).await,
        ));
    }
    if plan.soc_target_percent {
        outcomes.push((
            "soc_target_percent",
            actuator.set_soc_target(desired.soc_target_percent).await,
        ));
    }
    if plan.water_temp_c {
        outcomes.push(("water_temp_c", actuator.set_water_temp(desired.water_temp_c).await));
    }
    outcomes
}

/// The "Accountant": updates the WAC ledger from an observed SoC delta
/// (spec.md §4.E). `price_sek_per_kwh` is the spot import price for the
/// tick; PV-sourced charging should be charged in at price 0 by the caller
/// when it can attribute the delta to PV (diluting WAC, per spec.md).
pub fn update_ledger(
    ledger: &mut LedgerRecord,
    delta_kwh: f64,
    price_sek_per_kwh: f64,
    capacity_kwh: f64,
) {
    // Bound to physically plausible values: never more than the full
    // capacity can move in one tick.
    let bounded = delta_kwh.clamp(-capacity_kwh, capacity_kwh);
    if bounded > kepler_types::schedule::EPSILON {
        ledger.apply_charge(bounded, price_sek_per_kwh);
    } else if bounded < -kepler_types::schedule::EPSILON {
        ledger.apply_discharge(-bounded);
    }
}

/// Build the append-only execution record for this tick (spec.md §3/§4.E).
#[must_use]
pub fn build_execution_record(
    now: DateTime<Utc>,
    slot_start_time: DateTime<Utc>,
    soc_before_percent: f64,
    commands: &Commands,
    latency_ms: u64,
    failures: &[(&'static str, kepler_types::KeplerError)],
) -> ExecutionRecord {
    let result = if failures.is_empty() {
        ExecutionResult::Success
    } else {
        ExecutionResult::Failed {
            reason: failures.iter().map(|(field, err)| format!("{field}: {err}")).collect::<Vec<_>>().join("; "),
        }
    };
    ExecutionRecord {
        timestamp: now,
        slot_start_time,
        soc_before_percent,
        work_mode: format!("{:?}", commands.work_mode),
        charge_current_a: commands.charge_current_a,
        water_temp_c: commands.water_temp_c,
        soc_target_percent: commands.soc_target_percent,
        override_type: commands.override_type,
        result,
        latency_ms,
    }
}

/// Executor cadence/ordering state, carried across ticks so the Accountant
/// can diff the actuator-reported SoC against the *previous tick's* reading
/// rather than the planned target (spec.md §4.E), and so hysteresis diffs
/// against what was actually last dispatched rather than a reconstruction
/// from the execution log. Shared via `ExecutorTickDeps::state` rather than
/// the `bevy_ecs::World`, since the tick body runs inside a spawned `tokio`
/// task that outlives any one `Update` system call.
#[derive(Debug, Clone, Default)]
pub struct ExecutorState {
    pub last_dispatched: Option<Commands>,
    pub last_soc_percent: Option<f64>,
    pub last_tick_at: Option<DateTime<Utc>>,
}

/// Read the live sensors an Executor tick needs (spec.md §4.E `ReadState`).
/// A missing battery SoC sensor is treated as `ActuatorUnreachable`; PV/load
/// sensors default to 0 so a transient miss degrades to "no excess PV"
/// rather than aborting the tick.
pub async fn read_live_telemetry(actuator: &dyn Actuator) -> Result<LiveTelemetry, kepler_types::KeplerError> {
    let soc = actuator
        .get_sensor(SensorId::BatterySocPercent)
        .await?
        .ok_or_else(|| kepler_types::KeplerError::ActuatorUnreachable("battery SoC sensor unavailable".to_string()))?;
    let pv = actuator.get_sensor(SensorId::PvPowerKw).await.ok().flatten().unwrap_or(0.0);
    let load = actuator.get_sensor(SensorId::LoadPowerKw).await.ok().flatten().unwrap_or(0.0);
    Ok(LiveTelemetry {
        current_soc_percent: soc,
        pv_kw_live: pv,
        load_kw_live: load,
    })
}

/// Everything one Executor tick needs (spec.md §4.E's seven stages),
/// bundled the same way [`crate::scheduler::PlanCycleDeps`] bundles the
/// Scheduler's collaborators. `state` carries the previous tick's reading
/// across calls; a fresh `ExecutorState::default()` is correct for a
/// single-shot CLI invocation with no prior tick to diff against.
#[derive(Clone)]
pub struct ExecutorTickDeps {
    pub config: Arc<SystemConfig>,
    pub store: Arc<dyn Store>,
    pub actuator: Arc<dyn Actuator>,
    pub state: Arc<Mutex<ExecutorState>>,
}

/// Run one full Executor tick: `FetchSlot` -> `ReadState` ->
/// `EvaluateOverrides` -> `ComputeCommands` -> `DispatchCommands` ->
/// `UpdateLedger` -> `LogRecord` (spec.md §4.E). Never propagates an
/// actuator failure — a failed command is recorded in the returned
/// [`ExecutionRecord`], not returned as `Err`. Only a Store failure or a
/// missing battery SoC sensor aborts the tick early.
pub async fn run_executor_tick(deps: ExecutorTickDeps, now: DateTime<Utc>) -> Result<ExecutionRecord, KeplerError> {
    let tick_start = std::time::Instant::now();

    // FetchSlot.
    let slot = crate::store::with_retry(|| deps.store.get_slot_for(now)).map_err(KeplerError::from)?;

    // ReadState.
    let telemetry = match read_live_telemetry(deps.actuator.as_ref()).await {
        Ok(t) => t,
        Err(err) => return Err(err),
    };

    // EvaluateOverrides + ComputeCommands.
    let commands = match &slot {
        Some(slot) => decide_commands(slot, telemetry, &deps.config),
        None => idle_commands(&deps.config),
    };

    let (previous_commands, previous_soc_percent) = {
        let state = deps
            .state
            .lock()
            .map_err(|_| KeplerError::StoreIO("executor state lock poisoned".to_string()))?;
        (state.last_dispatched.clone(), state.last_soc_percent)
    };

    // DispatchCommands.
    let plan = diff_commands(&commands, previous_commands.as_ref(), Hysteresis::default());
    let outcomes = dispatch_commands(deps.actuator.as_ref(), &commands, plan).await;
    let failures: Vec<(&'static str, KeplerError)> = outcomes
        .into_iter()
        .filter_map(|(field, result)| match result {
            Ok(()) => None,
            Err(err) => Some((field, err)),
        })
        .collect();
    for (field, err) in &failures {
        tracing::warn!(field, error = %err, "actuator command failed, continuing tick");
    }

    // UpdateLedger: the energy actually charged or discharged since the
    // previous tick, from the actuator-reported SoC delta (spec.md §4.E) —
    // not the move toward the planned target, which the actuator may not
    // have caught up to yet. The very first tick (no `previous_soc_percent`)
    // has nothing to diff against, so it books nothing and only establishes
    // a baseline for the next one.
    if let Some(slot) = &slot
        && let Some(previous_soc_percent) = previous_soc_percent
    {
        let mut ledger = deps.store.read_battery_cost().map_err(KeplerError::from)?;
        let delta_kwh = (telemetry.current_soc_percent - previous_soc_percent) / 100.0 * deps.config.battery.capacity_kwh;
        let price = if slot.classification == Classification::PvCharge {
            0.0
        } else {
            slot.import_price
        };
        update_ledger(&mut ledger, delta_kwh, price, deps.config.battery.capacity_kwh);
        crate::store::with_retry(|| deps.store.upsert_battery_cost(ledger.stored_kwh, ledger.total_cost_sek))
            .map_err(KeplerError::from)?;
    }

    // LogRecord.
    let record = build_execution_record(
        now,
        slot.as_ref().map_or(now, |s| s.start_time),
        telemetry.current_soc_percent,
        &commands,
        u64::try_from(tick_start.elapsed().as_millis()).unwrap_or(u64::MAX),
        &failures,
    );
    crate::store::with_retry(|| deps.store.append_execution_record(&record)).map_err(KeplerError::from)?;

    {
        let mut state = deps
            .state
            .lock()
            .map_err(|_| KeplerError::StoreIO("executor state lock poisoned".to_string()))?;
        state.last_dispatched = Some(commands);
        state.last_soc_percent = Some(telemetry.current_soc_percent);
        state.last_tick_at = Some(now);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kepler_types::config::*;

    fn sample_config() -> SystemConfig {
        SystemConfig {
            battery: BatteryConfig {
                capacity_kwh: 10.0,
                min_soc_percent: 10.0,
                max_soc_percent: 90.0,
                max_charge_kw: 5.0,
                max_discharge_kw: 5.0,
                roundtrip_efficiency: 0.9,
                default_wac_sek_per_kwh: 1.0,
            },
            horizon: HorizonConfig::default(),
            scheduler: SchedulerConfig::default(),
            executor: ExecutorConfig::default(),
            water_heater: WaterHeaterConfig::default(),
            kepler_solver: KeplerSolverConfig::default(),
            vacation: VacationConfig::default(),
            export: ExportConfig::default(),
        }
    }

    fn sample_slot(classification: Classification) -> PlannedSlot {
        PlannedSlot {
            start_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            charge_kw: if matches!(classification, Classification::Charge | Classification::PvCharge) {
                2.0
            } else {
                0.0
            },
            discharge_kw: if classification == Classification::Discharge { 2.0 } else { 0.0 },
            export_kw: 0.0,
            water_heat_active: classification == Classification::WaterHeat,
            projected_soc_percent: 50.0,
            soc_target_percent: 50.0,
            classification,
            import_price: 1.0,
            export_price: 0.5,
            is_historical: false,
            actual_soc_percent: None,
        }
    }

    /// S4: SoC 12%, min_soc 15%, safety_margin 2% -> Low-SoC override fires
    /// even though the schedule says Discharge.
    #[test]
    fn scenario_s4_low_soc_override_fires() {
        let mut config = sample_config();
        config.battery.min_soc_percent = 15.0;
        config.executor.safety_margin_percent = 2.0;
        let slot = sample_slot(Classification::Discharge);
        let telemetry = LiveTelemetry {
            current_soc_percent: 12.0,
            pv_kw_live: 0.0,
            load_kw_live: 0.0,
        };

        let commands = decide_commands(&slot, telemetry, &config);
        assert_eq!(commands.override_type, OverrideType::LowSoC);
        assert_eq!(commands.work_mode, WorkMode::ZeroExport);
        assert_eq!(commands.charge_current_a, 0.0);
        assert_eq!(commands.water_temp_c, config.water_heater.temp_off);
    }

    #[test]
    fn excess_pv_override_enables_water_heat_when_export_unprofitable() {
        let mut config = sample_config();
        config.battery.max_soc_percent = 90.0;
        let mut slot = sample_slot(Classification::Hold);
        slot.export_price = -0.1;
        let telemetry = LiveTelemetry {
            current_soc_percent: 89.0,
            pv_kw_live: 5.0,
            load_kw_live: 1.0,
        };

        let commands = decide_commands(&slot, telemetry, &config);
        assert_eq!(commands.override_type, OverrideType::ExcessPv);
        assert_eq!(commands.work_mode, WorkMode::ZeroExport);
        assert_eq!(commands.water_temp_c, config.water_heater.temp_boost);
    }

    #[test]
    fn manual_pause_overrides_everything() {
        let mut config = sample_config();
        config.executor.paused = true;
        let slot = sample_slot(Classification::Charge);
        let telemetry = LiveTelemetry {
            current_soc_percent: 50.0,
            pv_kw_live: 0.0,
            load_kw_live: 0.0,
        };
        let commands = decide_commands(&slot, telemetry, &config);
        assert_eq!(commands.override_type, OverrideType::ManualPause);
    }

    #[test]
    fn no_override_follows_the_planned_slot() {
        let config = sample_config();
        let slot = sample_slot(Classification::Charge);
        let telemetry = LiveTelemetry {
            current_soc_percent: 50.0,
            pv_kw_live: 0.0,
            load_kw_live: 0.0,
        };
        let commands = decide_commands(&slot, telemetry, &config);
        assert_eq!(commands.override_type, OverrideType::None);
        assert_eq!(commands.work_mode, WorkMode::Charge);
        assert!(commands.charge_current_a > 0.0);
    }

    #[test]
    fn idle_state_disables_everything() {
        let config = sample_config();
        let commands = idle_commands(&config);
        assert_eq!(commands.work_mode, WorkMode::ZeroExport);
        assert!(!commands.grid_charge_enabled);
        assert_eq!(commands.water_temp_c, config.water_heater.temp_off);
    }

    /// P6/S6: two consecutive ticks with unchanged desired state issue zero
    /// actuator commands.
    #[test]
    fn property_p6_repeated_identical_commands_are_a_noop() {
        let config = sample_config();
        let slot = sample_slot(Classification::Charge);
        let telemetry = LiveTelemetry {
            current_soc_percent: 50.0,
            pv_kw_live: 0.0,
            load_kw_live: 0.0,
        };
        let commands = decide_commands(&slot, telemetry, &config);

        let first_plan = diff_commands(&commands, None, Hysteresis::default());
        assert!(!first_plan.is_noop(), "first-ever tick must dispatch everything");

        let second_plan = diff_commands(&commands, Some(&commands), Hysteresis::default());
        assert!(second_plan.is_noop(), "identical desired state must be a no-op");
    }

    #[test]
    fn hysteresis_absorbs_small_current_jitter() {
        let mut previous_commands_charge = 10.0;
        let mut desired = Commands {
            work_mode: WorkMode::Charge,
            grid_charge_enabled: true,
            charge_current_a: previous_commands_charge,
            soc_target_percent: 60.0,
            water_temp_c: 55.0,
            override_type: OverrideType::None,
        };
        let previous = desired.clone();
        desired.charge_current_a += 3.0; // within +-5A hysteresis
        let plan = diff_commands(&desired, Some(&previous), Hysteresis::default());
        assert!(!plan.charge_current_a);

        previous_commands_charge = desired.charge_current_a;
        desired.charge_current_a = previous_commands_charge + 10.0; // outside hysteresis
        let plan2 = diff_commands(&desired, Some(&previous), Hysteresis::default());
        assert!(plan2.charge_current_a);
    }

    /// S5: mixed grid/PV charge then discharge via the ledger Accountant.
    #[test]
    fn scenario_s5_wac_after_mixed_charging() {
        let mut ledger = LedgerRecord {
            stored_kwh: 0.0,
            total_cost_sek: 0.0,
        };
        update_ledger(&mut ledger, 5.0, 1.0, 10.0);
        assert_eq!(ledger.stored_kwh, 5.0);
        assert_eq!(ledger.total_cost_sek, 5.0);

        update_ledger(&mut ledger, 5.0, 0.0, 10.0);
        assert_eq!(ledger.stored_kwh, 10.0);
        assert_eq!(ledger.total_cost_sek, 5.0);

        update_ledger(&mut ledger, -4.0, 1.0, 10.0);
        assert_eq!(ledger.stored_kwh, 6.0);
        assert!((ledger.total_cost_sek - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ledger_delta_is_bounded_to_capacity() {
        let mut ledger = LedgerRecord {
            stored_kwh: 0.0,
            total_cost_sek: 0.0,
        };
        update_ledger(&mut ledger, 1000.0, 1.0, 10.0);
        assert_eq!(ledger.stored_kwh, 10.0);
    }

    #[test]
    fn execution_record_captures_failures() {
        let commands = Commands {
            work_mode: WorkMode::Charge,
            grid_charge_enabled: true,
            charge_current_a: 10.0,
            soc_target_percent: 60.0,
            water_temp_c: 55.0,
            override_type: OverrideType::None,
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let failures = vec![(
            "work_mode",
            kepler_types::KeplerError::ActuatorUnreachable("timeout".to_string()),
        )];
        let record = build_execution_record(now, now, 50.0, &commands, 120, &failures);
        assert!(matches!(record.result, ExecutionResult::Failed { .. }));
    }

    #[test]
    fn execution_record_success_when_no_failures() {
        let commands = Commands {
            work_mode: WorkMode::Charge,
            grid_charge_enabled: true,
            charge_current_a: 10.0,
            soc_target_percent: 60.0,
            water_temp_c: 55.0,
            override_type: OverrideType::None,
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let record = build_execution_record(now, now, 50.0, &commands, 50, &[]);
        assert!(record.result.is_success());
    }
}
