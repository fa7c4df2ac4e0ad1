// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kepler_core::resources::ForecastProvider;
use kepler_types::{ForecastPoint, KeplerError, SLOT_MINUTES};
use serde::Deserialize;

use super::client::HaClient;
use super::config::HaConfig;

/// One point of a raw HA forecast attribute, the shape Nordpool-style price
/// integrations and solar-forecast integrations both expose: a `forecast`
/// attribute holding `[{start, value}, ...]`.
#[derive(Debug, Clone, Deserialize)]
struct RawForecastPoint {
    start: DateTime<Utc>,
    value: f64,
}

/// HA-flavored implementation of `kepler-core`'s `ForecastProvider` trait
/// (spec.md §6), reading four sensors whose `forecast` attribute is an
/// array of timestamped values, grounded in the teacher's
/// `solar_forecast_fetcher.rs` discover-then-sum pattern.
pub struct HaForecastProvider {
    client: HaClient,
    import_price_entity: String,
    export_price_entity: String,
    pv_forecast_entity: String,
    load_forecast_entity: String,
}

impl HaForecastProvider {
    #[must_use]
    pub fn new(config: HaConfig) -> Self {
        let prefix = config.inverter_prefix.clone();
        let client = HaClient::new(config.base_url, config.token);
        Self {
            client,
            import_price_entity: format!("sensor.{prefix}_import_price"),
            export_price_entity: format!("sensor.{prefix}_export_price"),
            pv_forecast_entity: format!("sensor.{prefix}_pv_forecast"),
            load_forecast_entity: format!("sensor.{prefix}_load_forecast"),
        }
    }

    async fn fetch_raw_forecast(&self, entity_id: &str) -> Result<Vec<RawForecastPoint>, KeplerError> {
        let state = self
            .client
            .get_state(entity_id)
            .await
            .map_err(KeplerError::from)?;
        let raw = state
            .attributes
            .get("forecast")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        if raw.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(raw)
            .map_err(|e| KeplerError::ForecastUnavailable(format!("{entity_id}: malformed forecast attribute: {e}")))
    }
}

/// Align a sparse, possibly hourly-resolution raw series onto the 15-minute
/// grid `[horizon_start, horizon_end)` by holding the most recent known
/// value forward. A timestamp with no preceding sample is left absent,
/// matching spec.md §6's "missing, never a synthesized zero" contract.
fn align_to_slots(
    raw: &[RawForecastPoint],
    horizon_start: DateTime<Utc>,
    horizon_end: DateTime<Utc>,
) -> BTreeMap<DateTime<Utc>, f64> {
    let mut sorted: Vec<&RawForecastPoint> = raw.iter().collect();
    sorted.sort_by_key(|p| p.start);

    let mut out = BTreeMap::new();
    let mut cursor = horizon_start;
    while cursor < horizon_end {
        if let Some(value) = sorted.iter().rev().find(|p| p.start <= cursor).map(|p| p.value) {
            out.insert(cursor, value);
        }
        cursor += chrono::Duration::minutes(SLOT_MINUTES);
    }
    out
}

#[async_trait]
impl ForecastProvider for HaForecastProvider {
    async fn get_forecast(
        &self,
        horizon_start: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> Result<Vec<ForecastPoint>, KeplerError> {
        let (import_raw, export_raw, pv_raw, load_raw) = (
            self.fetch_raw_forecast(&self.import_price_entity).await?,
            self.fetch_raw_forecast(&self.export_price_entity).await?,
            self.fetch_raw_forecast(&self.pv_forecast_entity).await?,
            self.fetch_raw_forecast(&self.load_forecast_entity).await?,
        );

        let import = align_to_slots(&import_raw, horizon_start, horizon_end);
        let export = align_to_slots(&export_raw, horizon_start, horizon_end);
        let pv = align_to_slots(&pv_raw, horizon_start, horizon_end);
        let load = align_to_slots(&load_raw, horizon_start, horizon_end);

        let slot_hours = f64::from(u32::try_from(SLOT_MINUTES).unwrap_or(15)) / 60.0;
        let mut points = Vec::new();
        let mut cursor = horizon_start;
        while cursor < horizon_end {
            // A slot only enters the forecast once the price is known; PV/load
            // default to 0 when genuinely absent (no production/consumption
            // forecast configured is common and shouldn't block planning).
            if let Some(&import_price) = import.get(&cursor) {
                let export_price = *export.get(&cursor).unwrap_or(&0.0);
                let pv_kw = *pv.get(&cursor).unwrap_or(&0.0);
                let load_kw = *load.get(&cursor).unwrap_or(&0.0);
                points.push(ForecastPoint {
                    start_time: cursor,
                    import_price,
                    export_price,
                    pv_kwh: pv_kw * slot_hours,
                    load_kwh: load_kw * slot_hours,
                });
            }
            cursor += chrono::Duration::minutes(SLOT_MINUTES);
        }
        Ok(points)
    }
}
