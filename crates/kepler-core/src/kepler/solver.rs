// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Backend selection. `good_lp` abstracts over several MILP solvers;
//! `HighsSolver` is the one this workspace ships, matching the backend the
//! rest of this corpus reaches for when `good_lp` needs to branch-and-bound
//! over binary variables.

use good_lp::{Solution, SolverModel, highs};
use kepler_types::{ForecastPoint, KeplerError};

use super::PlannerRequest;
use super::model::{self, SolvedModel};

pub trait Solver: Send + Sync {
    fn solve(
        &self,
        request: &PlannerRequest,
        forward_forecast: &[&ForecastPoint],
        tv_sek_per_kwh: f64,
    ) -> Result<SolvedModel, KeplerError>;
}

/// HiGHS via `good_lp`. Tolerance per spec.md §4.C: MIP gap or time limit,
/// whichever is reached first.
pub struct HighsSolver {
    pub mip_gap: f64,
    pub time_limit_seconds: u64,
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self {
            mip_gap: 0.01,
            time_limit_seconds: 30,
        }
    }
}

impl HighsSolver {
    #[must_use]
    pub fn with_config(config: &kepler_types::config::KeplerSolverConfig) -> Self {
        Self {
            mip_gap: config.mip_gap,
            time_limit_seconds: config.time_limit_seconds,
        }
    }
}

impl Solver for HighsSolver {
    fn solve(
        &self,
        request: &PlannerRequest,
        forward_forecast: &[&ForecastPoint],
        tv_sek_per_kwh: f64,
    ) -> Result<SolvedModel, KeplerError> {
        let n = forward_forecast.len();
        let assembled = model::assemble(request, forward_forecast, tv_sek_per_kwh)?;
        let objective = assembled.objective.clone();

        let mut problem = assembled.vars.minimise(assembled.objective).using(highs);
        problem.set_option("mip_rel_gap", self.mip_gap);
        problem.set_option("time_limit", self.time_limit_seconds as f64);

        let problem = model::add_constraints(problem, request, forward_forecast, &assembled.variables);

        let solution = problem.solve().map_err(|err| match err {
            good_lp::ResolutionError::Infeasible => {
                KeplerError::SolverInfeasible("MILP has no feasible solution".to_string())
            }
            other => KeplerError::SolverTimeout(format!("{other:?}")),
        })?;

        let charge_kw = (0..n).map(|t| solution.value(assembled.variables.charge[t])).collect();
        let discharge_kw = (0..n)
            .map(|t| solution.value(assembled.variables.discharge[t]))
            .collect();
        let export_kw = (0..n).map(|t| solution.value(assembled.variables.export[t])).collect();
        let water_heat_active = (0..n)
            .map(|t| solution.value(assembled.variables.water_heat[t]) > 0.5)
            .collect();
        let soc_percent = (0..n).map(|t| solution.value(assembled.variables.soc[t])).collect();
        let objective_value = solution.eval(objective);

        Ok(SolvedModel {
            charge_kw,
            discharge_kw,
            export_kw,
            water_heat_active,
            soc_percent,
            objective_value,
        })
    }
}
