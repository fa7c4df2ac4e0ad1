// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use kepler_types::{
    Classification, ExecutionRecord, ExecutionResult, LedgerRecord, OverrideType, PlannedSlot,
    Schedule, ScheduleMeta, VacationState,
};
use rusqlite::{Connection, OptionalExtension, params};

use super::StoreError;

/// `Store` backed by a single SQLite file behind a process-wide mutex.
/// Mirrors the teacher's `Database` (`fluxion-server/src/db.rs`): one
/// connection, `execute_batch` schema setup, transactional multi-table
/// writes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Io(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Io(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schedule_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                planned_at TEXT NOT NULL,
                planner_version TEXT NOT NULL,
                horizon_start TEXT NOT NULL,
                horizon_end TEXT NOT NULL,
                last_error TEXT,
                last_error_at TEXT
            );

            CREATE TABLE IF NOT EXISTS planned_slots (
                start_time TEXT PRIMARY KEY,
                charge_kw REAL NOT NULL,
                discharge_kw REAL NOT NULL,
                export_kw REAL NOT NULL,
                water_heat_active INTEGER NOT NULL,
                projected_soc_percent REAL NOT NULL,
                soc_target_percent REAL NOT NULL,
                classification TEXT NOT NULL,
                import_price REAL NOT NULL,
                export_price REAL NOT NULL,
                is_historical INTEGER NOT NULL,
                actual_soc_percent REAL
            );

            CREATE TABLE IF NOT EXISTS execution_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                slot_start_time TEXT NOT NULL,
                soc_before_percent REAL NOT NULL,
                work_mode TEXT NOT NULL,
                charge_current_a REAL NOT NULL,
                water_temp_c REAL NOT NULL,
                soc_target_percent REAL NOT NULL,
                override_type TEXT NOT NULL,
                result_success INTEGER NOT NULL,
                result_reason TEXT,
                latency_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS execution_log_timestamp ON execution_log (timestamp DESC);

            CREATE TABLE IF NOT EXISTS battery_cost_ledger (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                stored_kwh REAL NOT NULL,
                total_cost_sek REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS vacation_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                enabled INTEGER NOT NULL,
                end_date TEXT,
                last_anti_legionella_at TEXT
            );
            ",
        )
        .map_err(|e| StoreError::Io(format!("schema init failed: {e}")))?;
        Ok(())
    }
}

fn classification_to_str(c: Classification) -> &'static str {
    match c {
        Classification::Charge => "charge",
        Classification::Discharge => "discharge",
        Classification::Export => "export",
        Classification::WaterHeat => "water_heat",
        Classification::Hold => "hold",
        Classification::PvCharge => "pv_charge",
    }
}

fn classification_from_str(s: &str) -> Result<Classification, StoreError> {
    Ok(match s {
        "charge" => Classification::Charge,
        "discharge" => Classification::Discharge,
        "export" => Classification::Export,
        "water_heat" => Classification::WaterHeat,
        "hold" => Classification::Hold,
        "pv_charge" => Classification::PvCharge,
        other => return Err(StoreError::Io(format!("unknown classification: {other}"))),
    })
}

fn override_to_str(o: OverrideType) -> &'static str {
    match o {
        OverrideType::None => "none",
        OverrideType::LowSoC => "low_soc",
        OverrideType::ExcessPv => "excess_pv",
        OverrideType::NotifyOnly => "notify_only",
        OverrideType::ManualPause => "manual_pause",
    }
}

fn override_from_str(s: &str) -> Result<OverrideType, StoreError> {
    Ok(match s {
        "none" => OverrideType::None,
        "low_soc" => OverrideType::LowSoC,
        "excess_pv" => OverrideType::ExcessPv,
        "notify_only" => OverrideType::NotifyOnly,
        "manual_pause" => OverrideType::ManualPause,
        other => return Err(StoreError::Io(format!("unknown override type: {other}"))),
    })
}

fn row_to_slot(row: &rusqlite::Row) -> rusqlite::Result<PlannedSlot> {
    let start_time: String = row.get("start_time")?;
    let classification: String = row.get("classification")?;
    Ok(PlannedSlot {
        start_time: parse_ts(&start_time),
        charge_kw: row.get("charge_kw")?,
        discharge_kw: row.get("discharge_kw")?,
        export_kw: row.get("export_kw")?,
        water_heat_active: row.get::<_, i64>("water_heat_active")? != 0,
        projected_soc_percent: row.get("projected_soc_percent")?,
        soc_target_percent: row.get("soc_target_percent")?,
        classification: classification_from_str(&classification).unwrap_or(Classification::Hold),
        import_price: row.get("import_price")?,
        export_price: row.get("export_price")?,
        is_historical: row.get::<_, i64>("is_historical")? != 0,
        actual_soc_percent: row.get("actual_soc_percent")?,
    })
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap())
}

impl super::Store for SqliteStore {
    fn save_schedule(&self, meta: &ScheduleMeta, slots: &[PlannedSlot]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let tx = conn.transaction().map_err(|e| StoreError::Io(e.to_string()))?;

        tx.execute(
            "INSERT INTO schedule_meta (id, planned_at, planner_version, horizon_start, horizon_end, last_error, last_error_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                planned_at = excluded.planned_at,
                planner_version = excluded.planner_version,
                horizon_start = excluded.horizon_start,
                horizon_end = excluded.horizon_end,
                last_error = excluded.last_error,
                last_error_at = excluded.last_error_at",
            params![
                meta.planned_at.to_rfc3339(),
                meta.planner_version,
                meta.horizon_start.to_rfc3339(),
                meta.horizon_end.to_rfc3339(),
                meta.last_error,
                meta.last_error_at.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(|e| StoreError::Io(e.to_string()))?;

        tx.execute("DELETE FROM planned_slots", [])
            .map_err(|e| StoreError::Io(e.to_string()))?;

        for slot in slots {
            tx.execute(
                "INSERT INTO planned_slots (
                    start_time, charge_kw, discharge_kw, export_kw, water_heat_active,
                    projected_soc_percent, soc_target_percent, classification,
                    import_price, export_price, is_historical, actual_soc_percent
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    slot.start_time.to_rfc3339(),
                    slot.charge_kw,
                    slot.discharge_kw,
                    slot.export_kw,
                    slot.water_heat_active as i64,
                    slot.projected_soc_percent,
                    slot.soc_target_percent,
                    classification_to_str(slot.classification),
                    slot.import_price,
                    slot.export_price,
                    slot.is_historical as i64,
                    slot.actual_soc_percent,
                ],
            )
            .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        tx.commit().map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn load_schedule(&self) -> Result<Option<Schedule>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;

        let meta = conn
            .query_row(
                "SELECT planned_at, planner_version, horizon_start, horizon_end, last_error, last_error_at
                 FROM schedule_meta WHERE id = 1",
                [],
                |row| {
                    let planned_at: String = row.get(0)?;
                    let horizon_start: String = row.get(2)?;
                    let horizon_end: String = row.get(3)?;
                    let last_error_at: Option<String> = row.get(5)?;
                    Ok(ScheduleMeta {
                        planned_at: parse_ts(&planned_at),
                        planner_version: row.get(1)?,
                        horizon_start: parse_ts(&horizon_start),
                        horizon_end: parse_ts(&horizon_end),
                        last_error: row.get(4)?,
                        last_error_at: last_error_at.map(|s| parse_ts(&s)),
                    })
                },
            )
            .optional()
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let Some(meta) = meta else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT * FROM planned_slots ORDER BY start_time ASC")
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let slots = stmt
            .query_map([], row_to_slot)
            .map_err(|e| StoreError::Io(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(Some(Schedule { meta, slots }))
    }

    fn get_slot_for(&self, timestamp: DateTime<Utc>) -> Result<Option<PlannedSlot>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT * FROM planned_slots
                 WHERE start_time <= ?1
                 ORDER BY start_time DESC LIMIT 1",
            )
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let slot = stmt
            .query_row(params![timestamp.to_rfc3339()], row_to_slot)
            .optional()
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let Some(slot) = slot else {
            return Ok(None);
        };
        let end = slot.start_time + chrono::Duration::minutes(kepler_types::SLOT_MINUTES);
        if timestamp < end {
            Ok(Some(slot))
        } else {
            Ok(None)
        }
    }

    fn append_execution_record(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let (result_success, result_reason) = match &record.result {
            ExecutionResult::Success => (1i64, None),
            ExecutionResult::Failed { reason } => (0i64, Some(reason.clone())),
        };
        conn.execute(
            "INSERT INTO execution_log (
                timestamp, slot_start_time, soc_before_percent, work_mode,
                charge_current_a, water_temp_c, soc_target_percent, override_type,
                result_success, result_reason, latency_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.timestamp.to_rfc3339(),
                record.slot_start_time.to_rfc3339(),
                record.soc_before_percent,
                record.work_mode,
                record.charge_current_a,
                record.water_temp_c,
                record.soc_target_percent,
                override_to_str(record.override_type),
                result_success,
                result_reason,
                record.latency_ms as i64,
            ],
        )
        .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn read_recent_execution(&self, limit: usize) -> Result<Vec<ExecutionRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT timestamp, slot_start_time, soc_before_percent, work_mode,
                        charge_current_a, water_temp_c, soc_target_percent, override_type,
                        result_success, result_reason, latency_ms
                 FROM execution_log ORDER BY timestamp DESC LIMIT ?1",
            )
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let records = stmt
            .query_map(params![limit as i64], |row| {
                let timestamp: String = row.get(0)?;
                let slot_start_time: String = row.get(1)?;
                let override_type: String = row.get(7)?;
                let result_success: i64 = row.get(8)?;
                let result_reason: Option<String> = row.get(9)?;
                Ok(ExecutionRecord {
                    timestamp: parse_ts(&timestamp),
                    slot_start_time: parse_ts(&slot_start_time),
                    soc_before_percent: row.get(2)?,
                    work_mode: row.get(3)?,
                    charge_current_a: row.get(4)?,
                    water_temp_c: row.get(5)?,
                    soc_target_percent: row.get(6)?,
                    override_type: override_from_str(&override_type).unwrap_or(OverrideType::None),
                    result: if result_success != 0 {
                        ExecutionResult::Success
                    } else {
                        ExecutionResult::Failed {
                            reason: result_reason.unwrap_or_default(),
                        }
                    },
                    latency_ms: row.get::<_, i64>(10)? as u64,
                })
            })
            .map_err(|e| StoreError::Io(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(records)
    }

    fn upsert_battery_cost(&self, stored_kwh: f64, total_cost_sek: f64) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        conn.execute(
            "INSERT INTO battery_cost_ledger (id, stored_kwh, total_cost_sek)
             VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                stored_kwh = excluded.stored_kwh,
                total_cost_sek = excluded.total_cost_sek",
            params![stored_kwh, total_cost_sek],
        )
        .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn read_battery_cost(&self) -> Result<LedgerRecord, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let record = conn
            .query_row(
                "SELECT stored_kwh, total_cost_sek FROM battery_cost_ledger WHERE id = 1",
                [],
                |row| {
                    Ok(LedgerRecord {
                        stored_kwh: row.get(0)?,
                        total_cost_sek: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(record.unwrap_or(LedgerRecord {
            stored_kwh: 0.0,
            total_cost_sek: 0.0,
        }))
    }

    fn get_historical_executed_slots(&self, date: NaiveDate) -> Result<Vec<PlannedSlot>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = day_start + chrono::Duration::days(1);

        let mut stmt = conn
            .prepare(
                "SELECT timestamp, slot_start_time, soc_before_percent, work_mode,
                        charge_current_a, water_temp_c, soc_target_percent, override_type,
                        result_success, result_reason, latency_ms
                 FROM execution_log
                 WHERE slot_start_time >= ?1 AND slot_start_time < ?2
                 ORDER BY slot_start_time ASC",
            )
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let rows = stmt
            .query_map(params![day_start.to_rfc3339(), day_end.to_rfc3339()], |row| {
                let slot_start_time: String = row.get(1)?;
                let work_mode: String = row.get(3)?;
                let soc_target_percent: f64 = row.get(6)?;
                let soc_before_percent: f64 = row.get(2)?;
                let charge_current_a: f64 = row.get(4)?;
                Ok((
                    parse_ts(&slot_start_time),
                    work_mode,
                    soc_before_percent,
                    soc_target_percent,
                    charge_current_a,
                ))
            })
            .map_err(|e| StoreError::Io(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let slots = rows
            .into_iter()
            .map(|(start_time, work_mode, soc_before, soc_target, current_a)| {
                let (charge_kw, discharge_kw) = match work_mode.as_str() {
                    "charge" => (current_a.max(0.0), 0.0),
                    "discharge" => (0.0, current_a.max(0.0)),
                    _ => (0.0, 0.0),
                };
                PlannedSlot {
                    start_time,
                    charge_kw,
                    discharge_kw,
                    export_kw: 0.0,
                    water_heat_active: work_mode == "water_heat",
                    projected_soc_percent: soc_target,
                    soc_target_percent: soc_target,
                    classification: Classification::classify(
                        charge_kw,
                        discharge_kw,
                        0.0,
                        work_mode == "water_heat",
                        0.0,
                        0.25,
                    ),
                    import_price: 0.0,
                    export_price: 0.0,
                    is_historical: true,
                    actual_soc_percent: Some(soc_before),
                }
            })
            .collect();
        Ok(slots)
    }

    fn read_vacation_state(&self) -> Result<VacationState, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        let state = conn
            .query_row(
                "SELECT enabled, end_date, last_anti_legionella_at FROM vacation_state WHERE id = 1",
                [],
                |row| {
                    let enabled: i64 = row.get(0)?;
                    let end_date: Option<String> = row.get(1)?;
                    let last_anti_legionella_at: Option<String> = row.get(2)?;
                    Ok(VacationState {
                        enabled: enabled != 0,
                        end_date: end_date.and_then(|s| s.parse().ok()),
                        last_anti_legionella_at: last_anti_legionella_at.map(|s| parse_ts(&s)),
                    })
                },
            )
            .optional()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(state.unwrap_or_default())
    }

    fn write_vacation_state(&self, state: &VacationState) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("poisoned lock".to_string()))?;
        conn.execute(
            "INSERT INTO vacation_state (id, enabled, end_date, last_anti_legionella_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                enabled = excluded.enabled,
                end_date = excluded.end_date,
                last_anti_legionella_at = excluded.last_anti_legionella_at",
            params![
                state.enabled as i64,
                state.end_date.map(|d| d.to_string()),
                state.last_anti_legionella_at.map(|t| t.to_rfc3339()),
            ],
        )
        .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::TimeZone;

    fn sample_meta() -> ScheduleMeta {
        ScheduleMeta {
            planned_at: Utc.with_ymd_and_hms(2026, 1, 1, 5, 5, 0).unwrap(),
            planner_version: "test".to_string(),
            horizon_start: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            horizon_end: Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap(),
            last_error: None,
            last_error_at: None,
        }
    }

    fn sample_slot(start: DateTime<Utc>) -> PlannedSlot {
        PlannedSlot {
            start_time: start,
            charge_kw: 2.0,
            discharge_kw: 0.0,
            export_kw: 0.0,
            water_heat_active: false,
            projected_soc_percent: 55.0,
            soc_target_percent: 55.0,
            classification: Classification::Charge,
            import_price: 1.2,
            export_price: 0.5,
            is_historical: false,
            actual_soc_percent: None,
        }
    }

    #[test]
    fn save_and_load_schedule_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let meta = sample_meta();
        let slot = sample_slot(meta.horizon_start);
        store.save_schedule(&meta, &[slot.clone()]).unwrap();

        let loaded = store.load_schedule().unwrap().unwrap();
        assert_eq!(loaded.slots.len(), 1);
        assert_eq!(loaded.slots[0].charge_kw, slot.charge_kw);
        assert_eq!(loaded.meta.planner_version, "test");
    }

    #[test]
    fn save_schedule_overwrites_previous_slots() {
        let store = SqliteStore::open_in_memory().unwrap();
        let meta = sample_meta();
        store.save_schedule(&meta, &[sample_slot(meta.horizon_start)]).unwrap();
        store.save_schedule(&meta, &[]).unwrap();

        let loaded = store.load_schedule().unwrap().unwrap();
        assert!(loaded.slots.is_empty());
    }

    #[test]
    fn get_slot_for_finds_containing_interval() {
        let store = SqliteStore::open_in_memory().unwrap();
        let meta = sample_meta();
        let start = meta.horizon_start;
        store.save_schedule(&meta, &[sample_slot(start)]).unwrap();

        let found = store.get_slot_for(start + chrono::Duration::minutes(5)).unwrap();
        assert!(found.is_some());

        let missed = store.get_slot_for(start - chrono::Duration::minutes(1)).unwrap();
        assert!(missed.is_none());
    }

    #[test]
    fn execution_log_is_append_only_and_ordered_recent_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        for i in 0..3 {
            let record = ExecutionRecord {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 1, i, 0, 0).unwrap(),
                slot_start_time: Utc.with_ymd_and_hms(2026, 1, 1, i, 0, 0).unwrap(),
                soc_before_percent: 50.0,
                work_mode: "hold".to_string(),
                charge_current_a: 0.0,
                water_temp_c: 0.0,
                soc_target_percent: 50.0,
                override_type: OverrideType::None,
                result: ExecutionResult::Success,
                latency_ms: 10,
            };
            store.append_execution_record(&record).unwrap();
        }
        let recent = store.read_recent_execution(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].timestamp > recent[1].timestamp);
    }

    #[test]
    fn battery_cost_ledger_upsert_replaces_single_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.read_battery_cost().unwrap().stored_kwh, 0.0);

        store.upsert_battery_cost(5.0, 4.0).unwrap();
        store.upsert_battery_cost(6.0, 5.0).unwrap();

        let ledger = store.read_battery_cost().unwrap();
        assert_eq!(ledger.stored_kwh, 6.0);
        assert_eq!(ledger.total_cost_sek, 5.0);
    }

    #[test]
    fn vacation_state_defaults_to_disabled() {
        let store = SqliteStore::open_in_memory().unwrap();
        let state = store.read_vacation_state().unwrap();
        assert!(!state.enabled);
        assert!(state.last_anti_legionella_at.is_none());
    }

    #[test]
    fn vacation_state_upsert_replaces_single_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let state = VacationState {
            enabled: true,
            end_date: Some(chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()),
            last_anti_legionella_at: Some(Utc.with_ymd_and_hms(2026, 7, 20, 3, 0, 0).unwrap()),
        };
        store.write_vacation_state(&state).unwrap();
        let loaded = store.read_vacation_state().unwrap();
        assert_eq!(loaded, state);

        let cleared = VacationState::default();
        store.write_vacation_state(&cleared).unwrap();
        assert_eq!(store.read_vacation_state().unwrap(), cleared);
    }
}
