// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Slots whose `start_time < now` are not re-optimized; they are copied from
//! the execution log so the dashboard shows a continuous schedule across
//! the re-plan boundary (spec.md §4.C, "Historical merge").

use kepler_types::{KeplerError, PlannedSlot};

use super::PlannerRequest;

pub fn historical_slots(
    request: &PlannerRequest,
    store: &dyn crate::store::Store,
) -> Result<Vec<PlannedSlot>, KeplerError> {
    let today = request.now.date_naive();
    let mut slots = store
        .get_historical_executed_slots(today)
        .map_err(KeplerError::from)?;
    slots.retain(|slot| slot.start_time >= request.horizon_start && slot.start_time < request.now);
    slots.sort_by_key(|slot| slot.start_time);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, Store};
    use chrono::{TimeZone, Utc};
    use kepler_types::{BatteryState, ExecutionRecord, ExecutionResult, ForecastPoint, OverrideType};

    fn sample_request(now: chrono::DateTime<Utc>, horizon_start: chrono::DateTime<Utc>) -> PlannerRequest {
        PlannerRequest {
            now,
            horizon_start,
            forecast: vec![ForecastPoint {
                start_time: now,
                import_price: 1.0,
                export_price: 0.5,
                pv_kwh: 0.0,
                load_kwh: 0.1,
            }],
            battery: BatteryState {
                capacity_kwh: 10.0,
                min_soc_percent: 10.0,
                max_soc_percent: 90.0,
                max_charge_kw: 5.0,
                max_discharge_kw: 5.0,
                roundtrip_efficiency: 0.9,
                current_soc_percent: 50.0,
            },
            water_heater: None,
            export: super::ExportInput {
                enabled: false,
                max_export_kw: 0.0,
            },
            wear_cost_sek_per_kwh: 0.0,
            ramping_cost_sek_per_kw: 0.0,
            planner_version: "test".to_string(),
        }
    }

    #[test]
    fn only_slots_within_the_horizon_before_now_are_merged() {
        let store = SqliteStore::open_in_memory().unwrap();
        let horizon_start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 6, 0, 0).unwrap();

        for hour in [2, 8] {
            let slot_start = Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap();
            let record = ExecutionRecord {
                timestamp: slot_start,
                slot_start_time: slot_start,
                soc_before_percent: 40.0,
                work_mode: "charge".to_string(),
                charge_current_a: 5.0,
                water_temp_c: 0.0,
                soc_target_percent: 45.0,
                override_type: OverrideType::None,
                result: ExecutionResult::Success,
                latency_ms: 50,
            };
            store.append_execution_record(&record).unwrap();
        }

        let request = sample_request(now, horizon_start);
        let slots = historical_slots(&request, &store).unwrap();

        assert_eq!(slots.len(), 1);
        assert!(slots[0].start_time < now);
        assert!(slots[0].is_historical);
    }
}
