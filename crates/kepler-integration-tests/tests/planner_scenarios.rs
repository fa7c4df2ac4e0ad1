// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! End-to-end Planner scenarios that need a real MILP solve, so they live
//! outside `kepler-core`'s unit tests (mirrors the teacher's split between
//! `#[cfg(test)]` unit tests and `fluxion-integration-tests`).

use chrono::{TimeZone, Utc};
use good_lp::{IntoAffineExpression, Solution, SolverModel, highs};
use kepler_core::kepler::model;
use kepler_core::kepler::terminal_value::terminal_value;
use kepler_core::kepler::{ExportInput, HighsSolver, PlannerRequest, WaterHeaterInput, plan};
use kepler_core::store::SqliteStore;
use kepler_types::{BatteryState, ForecastPoint, KeplerError};

fn forecast_point(start: chrono::DateTime<Utc>, import_price: f64, export_price: f64, pv_kwh: f64, load_kwh: f64) -> ForecastPoint {
    ForecastPoint {
        start_time: start,
        import_price,
        export_price,
        pv_kwh,
        load_kwh,
    }
}

/// S1: arbitrage between a cheap first half and an expensive second half of
/// the horizon. No load/PV in the cheap half so charging is grid-only; the
/// expensive half carries a load (0.2 kWh/slot, matching the spec's "net
/// profit by self-consumption") that discharge should cover instead of
/// importing at the expensive price. With `eta_rt = 0.9`, the 80-point SoC
/// swing from cap to floor only delivers ~7.6 kWh, less than the expensive
/// half's 9.6 kWh of total load, so the battery should still drain to the
/// floor and stay there for the remaining slots.
#[test]
fn scenario_s1_arbitrage_between_two_prices() {
    let horizon_start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let forecast: Vec<ForecastPoint> = (0..96)
        .map(|i| {
            let start = horizon_start + chrono::Duration::minutes(15 * i);
            let price = if i < 48 { 0.50 } else { 3.00 };
            let load_kwh = if i < 48 { 0.0 } else { 0.2 };
            forecast_point(start, price, 0.0, 0.0, load_kwh)
        })
        .collect();

    let request = PlannerRequest {
        now: horizon_start,
        horizon_start,
        forecast,
        battery: BatteryState {
            capacity_kwh: 10.0,
            min_soc_percent: 10.0,
            max_soc_percent: 90.0,
            max_charge_kw: 5.0,
            max_discharge_kw: 5.0,
            roundtrip_efficiency: 0.9,
            current_soc_percent: 10.0,
        },
        water_heater: None,
        export: ExportInput {
            enabled: false,
            max_export_kw: 0.0,
        },
        wear_cost_sek_per_kwh: 0.0,
        ramping_cost_sek_per_kw: 0.0,
        planner_version: "test".to_string(),
    };

    let store = SqliteStore::open_in_memory().unwrap();
    let solver = HighsSolver::default();
    let response = plan(&request, &store, &solver).expect("arbitrage scenario must solve");

    assert_eq!(response.slots.len(), 96);
    assert!(
        response.objective_value_sek < 0.0,
        "arbitrage should be a net profit, got {}",
        response.objective_value_sek
    );

    let cheap_end = &response.slots[47];
    assert!(
        cheap_end.projected_soc_percent >= 85.0,
        "expected SoC near the 90% cap by the end of the cheap window, got {}",
        cheap_end.projected_soc_percent
    );
    let horizon_end = response.slots.last().unwrap();
    assert!(
        horizon_end.projected_soc_percent <= 15.0,
        "expected SoC drawn down near the 10% floor by the end of the horizon, got {}",
        horizon_end.projected_soc_percent
    );

    let charged_in_cheap_window = response.slots[..48].iter().any(|s| s.charge_kw > 0.0);
    let discharged_in_expensive_window = response.slots[48..].iter().any(|s| s.discharge_kw > 0.0);
    assert!(charged_in_cheap_window, "expected charging during the cheap slots");
    assert!(discharged_in_expensive_window, "expected discharging during the expensive slots");
}

fn water_heater_request(forecast: Vec<ForecastPoint>, horizon_start: chrono::DateTime<Utc>) -> PlannerRequest {
    PlannerRequest {
        now: horizon_start,
        horizon_start,
        forecast,
        battery: BatteryState {
            capacity_kwh: 1.0,
            min_soc_percent: 0.0,
            max_soc_percent: 100.0,
            max_charge_kw: 0.0,
            max_discharge_kw: 0.0,
            roundtrip_efficiency: 1.0,
            current_soc_percent: 50.0,
        },
        water_heater: Some(WaterHeaterInput {
            power_kw: 3.0,
            min_kwh_per_day: 20.0,
            max_hours_between_heating: 24.0,
            already_heated_today_kwh: 0.0,
            comfort_penalty_sek_per_hour_over_gap: 0.0,
            hard_gap_enforcement: false,
            forced_on_slots: Vec::new(),
        }),
        export: ExportInput {
            enabled: false,
            max_export_kw: 0.0,
        },
        wear_cost_sek_per_kwh: 0.0,
        ramping_cost_sek_per_kw: 0.0,
        planner_version: "test".to_string(),
    }
}

fn flat_forecast(horizon_start: chrono::DateTime<Utc>, slot_count: i64) -> Vec<ForecastPoint> {
    (0..slot_count)
        .map(|i| forecast_point(horizon_start + chrono::Duration::minutes(15 * i), 1.0, 0.0, 0.0, 0.0))
        .collect()
}

/// S2 (feasible leg): 20 kWh at 3 kW needs 6.67h of heating, which fits in an
/// 8h horizon (32 slots).
#[test]
fn scenario_s2_water_heating_minimum_is_feasible_over_eight_hours() {
    let horizon_start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let request = water_heater_request(flat_forecast(horizon_start, 32), horizon_start);

    let store = SqliteStore::open_in_memory().unwrap();
    let solver = HighsSolver::default();
    let response = plan(&request, &store, &solver).expect("8h horizon must satisfy the daily minimum");

    let heated_kwh: f64 = response.slots.iter().filter(|s| s.water_heat_active).count() as f64 * 3.0 * 0.25;
    assert!(
        heated_kwh >= 20.0 - 1e-6,
        "expected at least 20 kWh of water heating, got {heated_kwh}"
    );
}

/// S2 (infeasible leg): the same 20 kWh minimum cannot fit in a 3h horizon
/// (12 slots, 9 kWh max deliverable) and must surface `SolverInfeasible`.
#[test]
fn scenario_s2_water_heating_minimum_is_infeasible_over_three_hours() {
    let horizon_start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let request = water_heater_request(flat_forecast(horizon_start, 12), horizon_start);

    let store = SqliteStore::open_in_memory().unwrap();
    let solver = HighsSolver::default();
    let result = plan(&request, &store, &solver);

    assert!(
        matches!(result, Err(KeplerError::SolverInfeasible(_))),
        "expected SolverInfeasible, got {result:?}"
    );
}

/// S6: two charge paths that deliver the same total energy over a flat-price
/// window (so the grid-import, wear, and terminal-value terms of the
/// objective are identical) but differ in how much they ramp. Pinning each
/// path in turn through the real [`model::assemble`]/[`model::add_constraints`]
/// pipeline and reading back the solved objective shows the Planner's cost
/// function strictly prefers the smoother path once `ramping_cost_sek_per_kw`
/// is positive, and is indifferent when it is zero.
#[test]
fn scenario_s6_ramping_penalty_prefers_the_smoother_path() {
    let horizon_start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let forecast = flat_forecast(horizon_start, 4);

    let objective_for = |ramping_cost: f64, charge_profile: [f64; 4]| -> f64 {
        let request = PlannerRequest {
            now: horizon_start,
            horizon_start,
            forecast: forecast.clone(),
            battery: BatteryState {
                capacity_kwh: 10.0,
                min_soc_percent: 0.0,
                max_soc_percent: 100.0,
                max_charge_kw: 4.0,
                max_discharge_kw: 4.0,
                roundtrip_efficiency: 1.0,
                current_soc_percent: 50.0,
            },
            water_heater: None,
            export: ExportInput {
                enabled: false,
                max_export_kw: 0.0,
            },
            wear_cost_sek_per_kwh: 0.0,
            ramping_cost_sek_per_kw: ramping_cost,
            planner_version: "test".to_string(),
        };
        let forward_forecast: Vec<&ForecastPoint> = request.forecast.iter().collect();
        let tv = terminal_value(&request.forecast);
        let assembled = model::assemble(&request, &forward_forecast, tv).unwrap();
        let objective = assembled.objective.clone();
        let mut problem = assembled.vars.minimise(assembled.objective).using(highs);
        problem = model::add_constraints(problem, &request, &forward_forecast, &assembled.variables);
        for (t, &c) in charge_profile.iter().enumerate() {
            problem.add_constraint(good_lp::Constraint::from(
                assembled.variables.charge[t].into_expression().eq(c),
            ));
            problem.add_constraint(good_lp::Constraint::from(
                assembled.variables.discharge[t].into_expression().eq(0.0),
            ));
        }
        let solution = problem.solve().expect("pinned profile must be feasible");
        solution.eval(objective)
    };

    let smooth = [0.0, 2.0, 2.0, 0.0]; // one ramp up, hold, one ramp down: total |delta| = 4
    let zigzag = [2.0, 0.0, 2.0, 0.0]; // alternating: total |delta| = 6
    // Same total charged energy (4 kW across the window either way), so the
    // grid-import/wear/terminal-value terms are identical between the two.

    let smooth_zero = objective_for(0.0, smooth);
    let zigzag_zero = objective_for(0.0, zigzag);
    assert!(
        (smooth_zero - zigzag_zero).abs() < 1e-6,
        "with no ramping cost the two profiles must cost the same: {smooth_zero} vs {zigzag_zero}"
    );

    let smooth_penalized = objective_for(1.0, smooth);
    let zigzag_penalized = objective_for(1.0, zigzag);
    assert!(
        smooth_penalized < zigzag_penalized,
        "with a ramping cost the smoother profile must be cheaper: {smooth_penalized} vs {zigzag_penalized}"
    );
}
