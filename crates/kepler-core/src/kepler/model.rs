// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The MILP itself: variables, constraints 1–7, and the objective from
//! spec.md §4.C. Building and solving are one pass because `good_lp`'s
//! constraint builder borrows the chosen backend (see [`super::solver`]).

use chrono::{Datelike, NaiveDate};
use good_lp::{Expression, IntoAffineExpression, ProblemVariables, Solution, SolverModel, Variable, variable};
use kepler_types::{Classification, ForecastPoint, KeplerError, PlannedSlot, round2};
use std::collections::BTreeMap;

use super::PlannerRequest;

/// Per-slot sliding window used for the soft water-heating gap constraint
/// (spec.md §4.C.6): 4 hours of quarter-hour slots.
const GAP_WINDOW_SLOTS: usize = 16;

pub struct ModelVariables {
    pub charge: Vec<Variable>,
    pub discharge: Vec<Variable>,
    pub export: Vec<Variable>,
    pub grid_import: Vec<Variable>,
    pub water_heat: Vec<Variable>,
    pub soc: Vec<Variable>,
    pub selector: Vec<Variable>,
    pub aux_charge_ramp: Vec<Variable>,
    pub aux_discharge_ramp: Vec<Variable>,
    pub gap_slack: Vec<Variable>,
}

/// Decision values read back from the solved model, one entry per forward
/// slot (index-aligned with `forward_forecast`).
pub struct SolvedModel {
    pub charge_kw: Vec<f64>,
    pub discharge_kw: Vec<f64>,
    pub export_kw: Vec<f64>,
    pub water_heat_active: Vec<bool>,
    pub soc_percent: Vec<f64>,
    pub objective_value: f64,
}

/// Build every variable, constraint, and the objective expression, handing
/// back the pieces the chosen solver backend needs to call `.solve()`.
/// `add_constraints` is invoked by the caller once it has picked a backend
/// via `good_lp::variables!().minimise(objective).using(...)`, because
/// `good_lp`'s constraint API is only available on the backend-specific
/// model type.
pub struct AssembledModel {
    pub vars: ProblemVariables,
    pub variables: ModelVariables,
    pub objective: Expression,
}

pub fn assemble(
    request: &PlannerRequest,
    forward_forecast: &[&ForecastPoint],
    tv_sek_per_kwh: f64,
) -> Result<AssembledModel, KeplerError> {
    let n = forward_forecast.len();
    let slot_hours = kepler_types::SLOT_MINUTES as f64 / 60.0;
    let battery = &request.battery;
    let water_enabled = request.water_heater.is_some();

    let mut vars = ProblemVariables::new();

    let charge: Vec<Variable> = (0..n)
        .map(|_| vars.add(variable().min(0.0).max(battery.max_charge_kw)))
        .collect();
    let discharge: Vec<Variable> = (0..n)
        .map(|_| vars.add(variable().min(0.0).max(battery.max_discharge_kw)))
        .collect();
    let grid_import: Vec<Variable> = (0..n).map(|_| vars.add(variable().min(0.0))).collect();
    let export: Vec<Variable> = (0..n)
        .map(|_| {
            if request.export.enabled {
                vars.add(variable().min(0.0).max(request.export.max_export_kw))
            } else {
                vars.add(variable().min(0.0).max(0.0))
            }
        })
        .collect();
    let water_heat: Vec<Variable> = (0..n)
        .map(|_| {
            if water_enabled {
                vars.add(variable().binary())
            } else {
                vars.add(variable().min(0.0).max(0.0))
            }
        })
        .collect();
    let soc: Vec<Variable> = (0..n)
        .map(|_| {
            vars.add(
                variable()
                    .min(battery.min_soc_percent)
                    .max(battery.max_soc_percent),
            )
        })
        .collect();
    let selector: Vec<Variable> = (0..n).map(|_| vars.add(variable().binary())).collect();
    let aux_charge_ramp: Vec<Variable> = (0..n).map(|_| vars.add(variable().min(0.0))).collect();
    let aux_discharge_ramp: Vec<Variable> = (0..n).map(|_| vars.add(variable().min(0.0))).collect();

    let gap_window_count = if water_enabled && n > 0 {
        n.div_ceil(GAP_WINDOW_SLOTS)
    } else {
        0
    };
    let gap_slack: Vec<Variable> = (0..gap_window_count)
        .map(|_| vars.add(variable().min(0.0)))
        .collect();

    let mut objective = Expression::from(0.0);
    for t in 0..n {
        let point = forward_forecast[t];
        objective = objective + grid_import[t] * point.import_price * slot_hours;
        objective = objective - export[t] * point.export_price * slot_hours;
        objective = objective
            + (charge[t] + discharge[t]) * request.wear_cost_sek_per_kwh * slot_hours;
        if t > 0 {
            objective = objective
                + (aux_charge_ramp[t] + aux_discharge_ramp[t]) * request.ramping_cost_sek_per_kw;
        }
    }
    if let Some(wh) = &request.water_heater {
        for &slack in &gap_slack {
            objective = objective + slack * wh.comfort_penalty_sek_per_hour_over_gap;
        }
    }
    if n > 0 {
        objective = objective - soc[n - 1] * tv_sek_per_kwh * battery.capacity_kwh / 100.0;
    }

    Ok(AssembledModel {
        vars,
        variables: ModelVariables {
            charge,
            discharge,
            export,
            grid_import,
            water_heat,
            soc,
            selector,
            aux_charge_ramp,
            aux_discharge_ramp,
            gap_slack,
        },
        objective,
    })
}

/// Add constraints 1–7 to a backend-specific solver model. Generic over
/// `SolverModel` so any `good_lp` backend (HiGHS today; CBC/Clarabel are the
/// same shape) can drive it.
pub fn add_constraints<M: SolverModel>(
    mut model: M,
    request: &PlannerRequest,
    forward_forecast: &[&ForecastPoint],
    vars: &ModelVariables,
) -> M {
    let n = forward_forecast.len();
    let slot_hours = kepler_types::SLOT_MINUTES as f64 / 60.0;
    let battery = &request.battery;
    let eta = battery.roundtrip_efficiency.sqrt();

    for t in 0..n {
        let point = forward_forecast[t];
        let prev_soc: Expression = if t == 0 {
            Expression::from(battery.current_soc_percent)
        } else {
            vars.soc[t - 1].into_expression()
        };

        // 1. SoC dynamics.
        let delta_soc = (vars.charge[t] * eta - vars.discharge[t] / eta) * slot_hours
            / battery.capacity_kwh
            * 100.0;
        model.add_constraint(good_lp::Constraint::from(
            vars.soc[t].into_expression().eq(prev_soc + delta_soc),
        ));

        // 3. Charge/discharge mutual exclusion via the selector.
        model.add_constraint(good_lp::Constraint::from(vars.charge[t].into_expression().leq(
            vars.selector[t].into_expression() * battery.max_charge_kw,
        )));
        model.add_constraint(good_lp::Constraint::from(vars.discharge[t].into_expression().leq(
            (Expression::from(1.0) - vars.selector[t]) * battery.max_discharge_kw,
        )));

        // 4. Energy balance.
        let water_load_kwh = if request.water_heater.is_some() {
            vars.water_heat[t] * request.water_heater.as_ref().unwrap().power_kw * slot_hours
        } else {
            Expression::from(0.0)
        };
        model.add_constraint(good_lp::Constraint::from(
            (vars.grid_import[t] + point.pv_kwh + vars.discharge[t] * slot_hours).eq(point
                .load_kwh
                + water_load_kwh
                + vars.charge[t] * slot_hours
                + vars.export[t] * slot_hours),
        ));

        // 7. Ramping: two auxiliary variables, two inequalities each.
        if t > 0 {
            let dc = vars.charge[t].into_expression() - vars.charge[t - 1];
            model.add_constraint(good_lp::Constraint::from(
                vars.aux_charge_ramp[t].into_expression().geq(dc.clone()),
            ));
            model.add_constraint(good_lp::Constraint::from(
                vars.aux_charge_ramp[t].into_expression().geq(-dc),
            ));
            let dd = vars.discharge[t].into_expression() - vars.discharge[t - 1];
            model.add_constraint(good_lp::Constraint::from(
                vars.aux_discharge_ramp[t].into_expression().geq(dd.clone()),
            ));
            model.add_constraint(good_lp::Constraint::from(
                vars.aux_discharge_ramp[t].into_expression().geq(-dd),
            ));
        }
    }

    model = apply_water_heating_constraints(model, request, forward_forecast, vars);
    model
}

fn apply_water_heating_constraints<M: SolverModel>(
    mut model: M,
    request: &PlannerRequest,
    forward_forecast: &[&ForecastPoint],
    vars: &ModelVariables,
) -> M {
    let Some(wh) = &request.water_heater else {
        return model;
    };
    let n = forward_forecast.len();
    let slot_hours = kepler_types::SLOT_MINUTES as f64 / 60.0;

    for &slot_index in &wh.forced_on_slots {
        if slot_index < n {
            model.add_constraint(good_lp::Constraint::from(
                vars.water_heat[slot_index].into_expression().eq(1.0),
            ));
        }
    }

    // 5. Daily minimum, grouped by calendar day; day 0 nets out what was
    // already heated today.
    if wh.min_kwh_per_day > 0.0 && wh.forced_on_slots.is_empty() {
        let mut slots_by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (t, point) in forward_forecast.iter().enumerate() {
            slots_by_day.entry(point.start_time.date_naive()).or_default().push(t);
        }
        for (day_index, (_date, indices)) in slots_by_day.iter().enumerate() {
            let mut required_kwh = wh.min_kwh_per_day;
            if day_index == 0 {
                required_kwh = (required_kwh - wh.already_heated_today_kwh).max(0.0);
            }
            if required_kwh > 0.0 {
                let mut day_sum = Expression::from(0.0);
                for &t in indices {
                    day_sum = day_sum + vars.water_heat[t];
                }
                model.add_constraint(good_lp::Constraint::from(
                    (day_sum * wh.power_kw * slot_hours).geq(required_kwh),
                ));
            }
        }
    }

    // 6. Soft gap: penalized in the objective via gap_slack, g_k >= bound - 0.
    for (window_index, chunk) in (0..n).collect::<Vec<_>>().chunks(GAP_WINDOW_SLOTS).enumerate() {
        if window_index >= vars.gap_slack.len() {
            break;
        }
        let mut window_sum = Expression::from(0.0);
        for &t in chunk {
            window_sum = window_sum + vars.water_heat[t];
        }
        let bound = Expression::from(wh.max_hours_between_heating) - window_sum * 0.25;
        model.add_constraint(good_lp::Constraint::from(
            vars.gap_slack[window_index].into_expression().geq(bound),
        ));
        if wh.hard_gap_enforcement {
            model.add_constraint(good_lp::Constraint::from(
                vars.gap_slack[window_index].into_expression().eq(0.0),
            ));
        }
    }

    model
}

/// Classify the solved decision values into [`PlannedSlot`]s, per spec.md
/// §4.C's deterministic priority order.
pub fn slots_from_solution(
    request: &PlannerRequest,
    forward_forecast: &[&ForecastPoint],
    solved: &SolvedModel,
) -> Vec<PlannedSlot> {
    let slot_hours = kepler_types::SLOT_MINUTES as f64 / 60.0;
    let mut out = Vec::with_capacity(forward_forecast.len());
    for (t, point) in forward_forecast.iter().enumerate() {
        // Classify on the raw solved values (tolerance-sensitive) before
        // rounding for the persisted contract (spec.md §6: "Numeric values
        // rounded to 2 decimals").
        let charge_kw = solved.charge_kw[t];
        let discharge_kw = solved.discharge_kw[t];
        let export_kw = solved.export_kw[t];
        let water_heat_active = solved.water_heat_active[t];
        let projected_soc_percent = solved.soc_percent[t];

        let classification = Classification::classify(
            charge_kw,
            discharge_kw,
            export_kw,
            water_heat_active,
            point.pv_kwh,
            slot_hours,
        );

        let soc_target_percent = projected_soc_percent
            .round()
            .clamp(request.battery.min_soc_percent, request.battery.max_soc_percent);

        out.push(PlannedSlot {
            start_time: point.start_time,
            charge_kw: round2(charge_kw),
            discharge_kw: round2(discharge_kw),
            export_kw: round2(export_kw),
            water_heat_active,
            projected_soc_percent: round2(projected_soc_percent),
            soc_target_percent: round2(soc_target_percent),
            classification,
            import_price: round2(point.import_price),
            export_price: round2(point.export_price),
            is_historical: false,
            actual_soc_percent: None,
        });
    }
    out
}
