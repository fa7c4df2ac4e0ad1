// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use async_trait::async_trait;
use kepler_core::resources::{Actuator, SensorId, WorkMode};
use kepler_types::KeplerError;

use super::client::HaClient;
use super::config::HaConfig;

/// HA-flavored implementation of `kepler-core`'s `Actuator` trait
/// (spec.md §6), grounded in the teacher's entity-id conventions
/// (`select.{prefix}_manual_mode_select`, `number.{prefix}_*`).
pub struct HaActuator {
    client: HaClient,
    prefix: String,
}

impl HaActuator {
    #[must_use]
    pub fn new(config: HaConfig) -> Self {
        let client = HaClient::new(config.base_url, config.token);
        Self {
            client,
            prefix: config.inverter_prefix,
        }
    }

    fn sensor_entity_id(&self, id: SensorId) -> String {
        let suffix = match id {
            SensorId::BatterySocPercent => "battery_soc",
            SensorId::PvPowerKw => "pv_power",
            SensorId::LoadPowerKw => "load_power",
            SensorId::WaterTempC => "water_heater_temp",
        };
        format!("sensor.{}_{}", self.prefix, suffix)
    }

    fn work_mode_entity_id(&self) -> String {
        format!("select.{}_work_mode_select", self.prefix)
    }

    fn grid_charge_entity_id(&self) -> String {
        format!("switch.{}_grid_charge", self.prefix)
    }

    fn charge_current_entity_id(&self) -> String {
        format!("number.{}_charge_current_a", self.prefix)
    }

    fn soc_target_entity_id(&self) -> String {
        format!("number.{}_soc_target_percent", self.prefix)
    }

    fn water_temp_entity_id(&self) -> String {
        format!("number.{}_water_heater_target_temp", self.prefix)
    }
}

fn work_mode_option(mode: WorkMode) -> &'static str {
    match mode {
        WorkMode::Export => "export",
        WorkMode::ZeroExport => "zero_export",
        WorkMode::Charge => "charge",
    }
}

#[async_trait]
impl Actuator for HaActuator {
    async fn get_sensor(&self, id: SensorId) -> Result<Option<f64>, KeplerError> {
        let entity_id = self.sensor_entity_id(id);
        self.client
            .get_numeric_state(&entity_id)
            .await
            .map_err(KeplerError::from)
    }

    async fn set_work_mode(&self, mode: WorkMode) -> Result<(), KeplerError> {
        let entity_id = self.work_mode_entity_id();
        self.client
            .call_service(
                "select",
                "select_option",
                serde_json::json!({"entity_id": entity_id, "option": work_mode_option(mode)}),
            )
            .await
            .map_err(KeplerError::from)
    }

    async fn set_grid_charge_enabled(&self, enabled: bool) -> Result<(), KeplerError> {
        let entity_id = self.grid_charge_entity_id();
        let service = if enabled { "turn_on" } else { "turn_off" };
        self.client
            .call_service("switch", service, serde_json::json!({"entity_id": entity_id}))
            .await
            .map_err(KeplerError::from)
    }

    async fn set_charge_current(&self, amps: f64) -> Result<(), KeplerError> {
        let entity_id = self.charge_current_entity_id();
        self.client
            .call_service(
                "number",
                "set_value",
                serde_json::json!({"entity_id": entity_id, "value": amps}),
            )
            .await
            .map_err(KeplerError::from)
    }

    async fn set_soc_target(&self, percent: f64) -> Result<(), KeplerError> {
        let entity_id = self.soc_target_entity_id();
        self.client
            .call_service(
                "number",
                "set_value",
                serde_json::json!({"entity_id": entity_id, "value": percent}),
            )
            .await
            .map_err(KeplerError::from)
    }

    async fn set_water_temp(&self, celsius: f64) -> Result<(), KeplerError> {
        let entity_id = self.water_temp_entity_id();
        self.client
            .call_service(
                "number",
                "set_value",
                serde_json::json!({"entity_id": entity_id, "value": celsius}),
            )
            .await
            .map_err(KeplerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_work_mode_posts_the_right_option() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/services/select/select_option")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "entity_id": "select.solax_work_mode_select",
                "option": "export"
            })))
            .with_status(200)
            .create_async()
            .await;

        let actuator = HaActuator::new(HaConfig {
            base_url: server.url(),
            token: "t".to_string(),
            inverter_prefix: "solax".to_string(),
        });
        actuator.set_work_mode(WorkMode::Export).await.unwrap();
    }

    #[tokio::test]
    async fn get_sensor_maps_to_prefixed_entity() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/states/sensor.solax_battery_soc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"entity_id":"sensor.solax_battery_soc","state":"42.0","attributes":{}}"#)
            .create_async()
            .await;

        let actuator = HaActuator::new(HaConfig {
            base_url: server.url(),
            token: "t".to_string(),
            inverter_prefix: "solax".to_string(),
        });
        let value = actuator.get_sensor(SensorId::BatterySocPercent).await.unwrap();
        assert_eq!(value, Some(42.0));
    }

    #[tokio::test]
    async fn actuator_rejected_maps_from_4xx_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/services/number/set_value")
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let actuator = HaActuator::new(HaConfig {
            base_url: server.url(),
            token: "t".to_string(),
            inverter_prefix: "solax".to_string(),
        });
        let err = actuator.set_charge_current(10.0).await.unwrap_err();
        assert!(matches!(err, KeplerError::ActuatorRejected(_)));
    }
}
