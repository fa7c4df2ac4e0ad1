// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use kepler_types::KeplerError;
use thiserror::Error;

/// Wire-level failures talking to the Home Assistant REST API. Mapped into
/// [`KeplerError`] at the trait boundary so `kepler-core` never sees an
/// HTTP-specific type.
#[derive(Error, Debug)]
pub enum HaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {entity_id} timed out")]
    Timeout { entity_id: String },

    #[error("HA returned error status {status} for {entity_id}: {message}")]
    ApiError {
        entity_id: String,
        status: u16,
        message: String,
    },

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("sensor state '{raw}' for {entity_id} is not a number")]
    NotNumeric { entity_id: String, raw: String },

    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

pub type HaResult<T> = Result<T, HaError>;

impl From<HaError> for KeplerError {
    fn from(err: HaError) -> Self {
        match err {
            HaError::Timeout { entity_id } => {
                KeplerError::ActuatorUnreachable(format!("timeout talking to {entity_id}"))
            }
            HaError::Http(e) if e.is_timeout() || e.is_connect() => {
                KeplerError::ActuatorUnreachable(e.to_string())
            }
            HaError::ApiError {
                entity_id,
                status,
                message,
            } => KeplerError::ActuatorRejected(format!("{entity_id}: HTTP {status} {message}")),
            HaError::EntityNotFound(entity_id) => {
                KeplerError::ActuatorUnreachable(format!("entity not found: {entity_id}"))
            }
            other => KeplerError::ActuatorUnreachable(other.to_string()),
        }
    }
}
