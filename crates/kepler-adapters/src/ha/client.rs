// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::errors::{HaError, HaResult};

/// Every actuator/sensor call is blocking-with-timeout (spec.md §6): no
/// request is allowed to hang the Executor tick past this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A single entity's current state, as returned by `/api/states/<entity_id>`.
#[derive(Debug, Clone, Deserialize)]
pub struct HaEntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Value,
}

/// Thin REST client for the Home Assistant API. Config (base URL, token)
/// comes from [`super::config::HaConfig`]; this struct only knows HTTP.
#[derive(Debug, Clone)]
pub struct HaClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HaClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// `GET /api/states/<entity_id>`.
    pub async fn get_state(&self, entity_id: &str) -> HaResult<HaEntityState> {
        let url = self.url(&format!("api/states/{entity_id}"));
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HaError::Timeout {
                        entity_id: entity_id.to_string(),
                    }
                } else {
                    HaError::Http(e)
                }
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(HaError::EntityNotFound(entity_id.to_string()));
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(HaError::ApiError {
                entity_id: entity_id.to_string(),
                status,
                message,
            });
        }
        resp.json::<HaEntityState>()
            .await
            .map_err(|e| HaError::InvalidResponse(e.to_string()))
    }

    /// `GET /api/states/<entity_id>`, parsed as a plain `f64`. Returns `Ok(None)`
    /// for HA's `"unavailable"`/`"unknown"` sentinel states, matching the
    /// "missing, never a synthesized zero" contract (spec.md §6).
    pub async fn get_numeric_state(&self, entity_id: &str) -> HaResult<Option<f64>> {
        let state = self.get_state(entity_id).await?;
        if state.state == "unavailable" || state.state == "unknown" {
            return Ok(None);
        }
        state
            .state
            .parse::<f64>()
            .map(Some)
            .map_err(|_| HaError::NotNumeric {
                entity_id: entity_id.to_string(),
                raw: state.state,
            })
    }

    /// `POST /api/services/<domain>/<service>` with a JSON payload.
    pub async fn call_service(&self, domain: &str, service: &str, payload: Value) -> HaResult<()> {
        let url = self.url(&format!("api/services/{domain}/{service}"));
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HaError::Timeout {
                        entity_id: payload
                            .get("entity_id")
                            .and_then(Value::as_str)
                            .unwrap_or("<unknown>")
                            .to_string(),
                    }
                } else {
                    HaError::Http(e)
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(HaError::ApiError {
                entity_id: payload
                    .get("entity_id")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown>")
                    .to_string(),
                status,
                message,
            });
        }
        Ok(())
    }
}
