// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single slot's worth of price and physical forecast, keyed by `start_time`.
///
/// `import_price`/`export_price` may be negative (valid, e.g. during a
/// negative-price event). `pv_kwh`/`load_kwh` are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub start_time: DateTime<Utc>,
    pub import_price: f64,
    pub export_price: f64,
    pub pv_kwh: f64,
    pub load_kwh: f64,
}

impl ForecastPoint {
    #[must_use]
    pub fn is_physically_valid(&self) -> bool {
        self.pv_kwh >= 0.0 && self.load_kwh >= 0.0
    }
}

/// Checks whether a full calendar day (96 quarter-hour slots, UTC-naive day
/// boundary) has a non-null forecast point for every slot.
#[must_use]
pub fn day_is_complete(points: &[ForecastPoint], day: chrono::NaiveDate) -> bool {
    let day_points: Vec<&ForecastPoint> = points
        .iter()
        .filter(|p| p.start_time.date_naive() == day)
        .collect();
    day_points.len() >= 96
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point_at(hour: u32, minute: u32) -> ForecastPoint {
        ForecastPoint {
            start_time: Utc.with_ymd_and_hms(2026, 1, 1, hour, minute, 0).unwrap(),
            import_price: 1.0,
            export_price: 0.5,
            pv_kwh: 0.0,
            load_kwh: 0.1,
        }
    }

    #[test]
    fn negative_prices_are_valid() {
        let mut p = point_at(0, 0);
        p.import_price = -0.5;
        assert!(p.is_physically_valid());
    }

    #[test]
    fn incomplete_day_is_detected() {
        let points: Vec<_> = (0..48).map(|i| point_at(i / 4, (i % 4) * 15)).collect();
        assert!(!day_is_complete(&points, chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }
}
