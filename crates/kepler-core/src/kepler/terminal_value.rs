// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Terminal value (spec.md §4.C.4): the economic credit assigned to the
//! battery's residual energy at the end of the horizon, so the solver has
//! no incentive to empty the battery right before the horizon ends.
//!
//! Deliberately independent of [`kepler_types::LedgerRecord`] — using the
//! stored weighted-average cost here would reward past purchase decisions
//! rather than future opportunity, the Sunk Cost Fallacy the spec calls out.

use kepler_types::ForecastPoint;

/// Mean of the cheapest 25% of import prices over the full horizon, clamped
/// to `[0, avg(import_price)]`.
#[must_use]
pub fn terminal_value(forecast: &[ForecastPoint]) -> f64 {
    if forecast.is_empty() {
        return 0.0;
    }

    let mut prices: Vec<f64> = forecast.iter().map(|p| p.import_price).collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let cheapest_count = ((prices.len() as f64) * 0.25).ceil().max(1.0) as usize;
    let cheapest_mean = prices[..cheapest_count].iter().sum::<f64>() / cheapest_count as f64;

    let avg_import_price = prices.iter().sum::<f64>() / prices.len() as f64;

    cheapest_mean.clamp(0.0, avg_import_price.max(0.0))
}
