// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Length of the atomic planning unit.
pub const SLOT_MINUTES: i64 = 15;

/// The atomic 15-minute unit the whole system plans and acts on.
///
/// `end_time - start_time` is always exactly [`SLOT_MINUTES`] minutes; slots
/// making up a [`crate::Schedule`] are contiguous and strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// 0-based index from the horizon start.
    pub slot_index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Slot {
    /// Build the `slot_index`-th slot of a horizon starting at `horizon_start`.
    #[must_use]
    pub fn at(horizon_start: DateTime<Utc>, slot_index: usize) -> Self {
        let start_time = horizon_start + Duration::minutes(SLOT_MINUTES * slot_index as i64);
        let end_time = start_time + Duration::minutes(SLOT_MINUTES);
        Self {
            slot_index,
            start_time,
            end_time,
        }
    }

    /// Build the full contiguous sequence of slots for a horizon.
    #[must_use]
    pub fn horizon(horizon_start: DateTime<Utc>, count: usize) -> Vec<Self> {
        (0..count).map(|i| Self::at(horizon_start, i)).collect()
    }

    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start_time && timestamp < self.end_time
    }

    /// Align a timestamp down to the nearest slot boundary.
    #[must_use]
    pub fn floor(timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let minute = timestamp.timestamp() / 60;
        let floored_minute = (minute / SLOT_MINUTES) * SLOT_MINUTES;
        DateTime::from_timestamp(floored_minute * 60, 0).unwrap_or(timestamp)
    }

    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_duration_is_exactly_900_seconds() {
        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let slot = Slot::at(start, 0);
        assert_eq!((slot.end_time - slot.start_time).num_seconds(), 900);
    }

    #[test]
    fn horizon_is_contiguous_and_increasing() {
        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let slots = Slot::horizon(start, 192);
        assert_eq!(slots.len(), 192);
        for window in slots.windows(2) {
            assert_eq!(window[0].end_time, window[1].start_time);
            assert!(window[0].start_time < window[1].start_time);
        }
    }

    #[test]
    fn floor_aligns_to_grid() {
        let t = DateTime::parse_from_rfc3339("2026-01-01T00:07:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let floored = Slot::floor(t);
        assert_eq!(floored.minute(), 0);
    }
}
