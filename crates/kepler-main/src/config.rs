// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Load and validate `kepler.toml` (spec.md §6), ported from the teacher's
//! `config/validation.rs` split between "parse" and "validate".

use std::path::Path;

use kepler_types::{KeplerError, SystemConfig};

/// Read and parse `kepler.toml`, then run [`SystemConfig::validate`].
/// Warnings are logged but do not block startup; any error does.
pub fn load_config(path: impl AsRef<Path>) -> Result<SystemConfig, KeplerError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| KeplerError::ConfigInvalid(format!("cannot read {}: {e}", path.display())))?;
    let config: SystemConfig = toml::from_str(&raw)
        .map_err(|e| KeplerError::ConfigInvalid(format!("cannot parse {}: {e}", path.display())))?;

    let result = config.validate();
    for warning in &result.warnings {
        tracing::warn!(field = %warning.field, message = %warning.message, "config warning");
    }
    if result.has_errors() {
        let joined = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(KeplerError::ConfigInvalid(joined));
    }
    Ok(config)
}
