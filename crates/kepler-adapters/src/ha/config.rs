// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use kepler_types::KeplerError;

/// Home Assistant connection settings. The token is read from the
/// environment, never from the TOML config file (spec.md §6 keeps secrets
/// out of the persisted config surface).
#[derive(Debug, Clone)]
pub struct HaConfig {
    pub base_url: String,
    pub token: String,
    /// Entity id prefix shared by every inverter/sensor this adapter reads
    /// or writes, e.g. `"solax"` yields `sensor.solax_battery_soc`.
    pub inverter_prefix: String,
}

impl HaConfig {
    /// Build from `HA_BASE_URL` / `HA_TOKEN` / `HA_INVERTER_PREFIX`
    /// environment variables, as the teacher's plugin does at startup.
    pub fn from_env() -> Result<Self, KeplerError> {
        let base_url = std::env::var("HA_BASE_URL")
            .map_err(|_| KeplerError::ConfigInvalid("HA_BASE_URL is not set".to_string()))?;
        let token = std::env::var("HA_TOKEN")
            .map_err(|_| KeplerError::ConfigInvalid("HA_TOKEN is not set".to_string()))?;
        if token.trim().is_empty() {
            return Err(KeplerError::ConfigInvalid("HA_TOKEN is empty".to_string()));
        }
        let inverter_prefix = std::env::var("HA_INVERTER_PREFIX").unwrap_or_else(|_| "solax".to_string());
        Ok(Self {
            base_url,
            token,
            inverter_prefix,
        })
    }
}
