// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Collaborator interfaces (spec.md §6) and the `bevy_ecs` resources that
//! wrap them. `kepler-core` defines the traits; `kepler-adapters` supplies
//! the HTTP-backed implementations. Mirrors the teacher's
//! `resources.rs`/`continuous_systems.rs` split: async collaborators live
//! behind `Arc<dyn Trait>` resources so systems never know whether they're
//! talking to HTTP or a test double.

use std::sync::Arc;

use async_trait::async_trait;
use bevy_ecs::prelude::*;
use chrono::{DateTime, Utc};
use kepler_types::{ForecastPoint, KeplerError, SystemConfig};

/// Inverter work mode, spec.md §6's actuator interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkMode {
    Export,
    ZeroExport,
    Charge,
}

/// Which physical sensor an Executor tick reads. Kept as a closed enum
/// (spec.md §9: no stringly-typed duck typing) even though the wire
/// protocol underneath is a free-form entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    BatterySocPercent,
    PvPowerKw,
    LoadPowerKw,
    WaterTempC,
}

/// The abstract home-automation bridge (spec.md §6). Every call is
/// blocking-with-timeout from the caller's point of view; implementations
/// enforce the 5s timeout internally so the trait itself stays sync-callable
/// from `spawn_blocking` or `.await`-able from an async impl.
#[async_trait]
pub trait Actuator: Send + Sync {
    async fn get_sensor(&self, id: SensorId) -> Result<Option<f64>, KeplerError>;
    async fn set_work_mode(&self, mode: WorkMode) -> Result<(), KeplerError>;
    async fn set_grid_charge_enabled(&self, enabled: bool) -> Result<(), KeplerError>;
    async fn set_charge_current(&self, amps: f64) -> Result<(), KeplerError>;
    async fn set_soc_target(&self, percent: f64) -> Result<(), KeplerError>;
    async fn set_water_temp(&self, celsius: f64) -> Result<(), KeplerError>;
}

/// The forecast/price provider (spec.md §6 / §4.B). Missing slots are
/// represented by a shorter `Vec`, never synthesized as zero.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn get_forecast(
        &self,
        horizon_start: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> Result<Vec<ForecastPoint>, KeplerError>;
}

#[derive(Resource, Clone)]
pub struct ActuatorResource(pub Arc<dyn Actuator>);

#[derive(Resource, Clone)]
pub struct ForecastProviderResource(pub Arc<dyn ForecastProvider>);

#[derive(Resource, Clone)]
pub struct StoreResource(pub Arc<dyn crate::store::Store>);

/// Shared handle to the Executor's cross-tick state (spec.md §4.E's
/// Accountant needs the previous tick's SoC reading, not just the World's
/// copy, since the tick body runs inside a spawned `tokio` task).
#[derive(Resource, Clone)]
pub struct ExecutorStateResource(pub Arc<std::sync::Mutex<crate::executor::ExecutorState>>);

/// The config surface from spec.md §6, read once at startup (`kepler-main`)
/// and never mutated by the core at runtime.
#[derive(Resource, Clone)]
pub struct ConfigResource(pub Arc<SystemConfig>);
