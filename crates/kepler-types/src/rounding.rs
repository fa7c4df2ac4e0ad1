// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

/// Round to 2 decimal places, as spec.md §6 requires for the persisted
/// schedule document. Used only at the serialization boundary; internal
/// Planner/Executor arithmetic stays full precision.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round2(1.005), 1.0); // 1.005 is not exactly representable; nearest-even rounding
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
    }

    #[test]
    fn handles_negative_values() {
        assert_eq!(round2(-0.501), -0.5);
    }
}
