// Copyright (c) 2026 Kepler EMS Contributors
//
// Licensed under the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>
// or the Apache License, Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>,
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! The configuration surface enumerated in spec.md §6. Read once at startup
//! by `kepler-main`; never mutated by the core at runtime.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    pub capacity_kwh: f64,
    pub min_soc_percent: f64,
    pub max_soc_percent: f64,
    pub max_charge_kw: f64,
    pub max_discharge_kw: f64,
    pub roundtrip_efficiency: f64,
    /// WAC reported for an empty ledger (`stored_kwh <= 0`), spec.md §3's
    /// "configured default" rather than a hardcoded constant, since a given
    /// installation's typical energy cost varies.
    #[serde(default = "default_wac_sek_per_kwh")]
    pub default_wac_sek_per_kwh: f64,
}

fn default_wac_sek_per_kwh() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    pub hours: u32,
    pub slot_minutes: u32,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            hours: 48,
            slot_minutes: 15,
        }
    }
}

impl HorizonConfig {
    #[must_use]
    pub fn slot_count(&self) -> usize {
        (self.hours * 60 / self.slot_minutes) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Trigger times in local time, e.g. `["00:05", "06:05", "12:05", "18:05"]`.
    pub trigger_times_local: Vec<String>,
    pub jitter_seconds: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            trigger_times_local: vec!["05:05".to_string()],
            jitter_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub tick_seconds: u64,
    pub safety_margin_percent: f64,
    pub nominal_bus_voltage: f64,
    pub paused: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 300,
            safety_margin_percent: 2.0,
            nominal_bus_voltage: 48.0,
            paused: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterHeaterConfig {
    pub enabled: bool,
    pub power_kw: f64,
    pub min_kwh_per_day: f64,
    pub max_hours_between_heating: f64,
    pub comfort_penalty_sek_per_hour: f64,
    pub temp_off: f64,
    pub temp_normal: f64,
    pub temp_boost: f64,
    /// Open Question #1 (spec.md §9): off by default; when set, the Planner
    /// additionally enforces a hard per-window minimum alongside the soft
    /// comfort-penalty slack.
    pub hard_gap_enforcement: bool,
}

impl Default for WaterHeaterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            power_kw: 3.0,
            min_kwh_per_day: 0.0,
            max_hours_between_heating: 24.0,
            comfort_penalty_sek_per_hour: 0.0,
            temp_off: 0.0,
            temp_normal: 55.0,
            temp_boost: 70.0,
            hard_gap_enforcement: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolverConfig {
    pub wear_cost_sek_per_kwh: f64,
    pub ramping_cost_sek_per_kw: f64,
    pub mip_gap: f64,
    pub time_limit_seconds: u64,
}

impl Default for KeplerSolverConfig {
    fn default() -> Self {
        Self {
            wear_cost_sek_per_kwh: 0.0,
            ramping_cost_sek_per_kw: 0.0,
            mip_gap: 0.01,
            time_limit_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VacationConfig {
    pub enabled: bool,
    pub anti_legionella_interval_days: u32,
    pub anti_legionella_hours: f64,
    pub anti_legionella_temp_c: f64,
}

impl Default for VacationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            anti_legionella_interval_days: 7,
            anti_legionella_hours: 2.0,
            anti_legionella_temp_c: 65.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub enabled: bool,
    pub max_export_kw: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_export_kw: 10.0,
        }
    }
}

/// The full config document: one `kepler.toml`, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub battery: BatteryConfig,
    #[serde(default)]
    pub horizon: HorizonConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub water_heater: WaterHeaterConfig,
    #[serde(default, rename = "kepler")]
    pub kepler_solver: KeplerSolverConfig,
    #[serde(default)]
    pub vacation: VacationConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Severity of a single [`ValidationIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Prevents the config from being used at all.
    Error,
    /// Config can be used but may not behave as the user expects.
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

/// Field-level validation result, ported from the teacher's
/// `config::validation` module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    #[must_use]
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        });
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl SystemConfig {
    /// Validate every numeric invariant spec.md names, in one pass, so a
    /// misconfigured system fails at startup rather than mid-plan.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        if self.battery.capacity_kwh <= 0.0 {
            result.add_error("battery.capacity_kwh", "must be positive");
        }
        if !(0.0..=100.0).contains(&self.battery.min_soc_percent) {
            result.add_error("battery.min_soc_percent", "must be within 0..=100");
        }
        if !(0.0..=100.0).contains(&self.battery.max_soc_percent) {
            result.add_error("battery.max_soc_percent", "must be within 0..=100");
        }
        if self.battery.min_soc_percent > self.battery.max_soc_percent {
            result.add_error("battery.min_soc_percent", "must not exceed max_soc_percent");
        }
        if self.battery.max_charge_kw < 0.0 {
            result.add_error("battery.max_charge_kw", "must be non-negative");
        }
        if self.battery.max_discharge_kw < 0.0 {
            result.add_error("battery.max_discharge_kw", "must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.battery.roundtrip_efficiency)
            || self.battery.roundtrip_efficiency <= 0.0
        {
            result.add_error("battery.roundtrip_efficiency", "must be within (0, 1]");
        }

        if self.horizon.hours == 0 {
            result.add_error("horizon.hours", "must be positive");
        }
        if self.horizon.slot_minutes == 0 || 60 % self.horizon.slot_minutes != 0 {
            result.add_error("horizon.slot_minutes", "must evenly divide 60");
        }

        if self.water_heater.enabled && self.water_heater.power_kw <= 0.0 {
            result.add_error("water_heater.power_kw", "must be positive when enabled");
        }

        if self.kepler_solver.mip_gap <= 0.0 || self.kepler_solver.mip_gap >= 1.0 {
            result.add_warning("kepler.mip_gap", "unusual value, expected a small fraction like 0.01");
        }
        if self.kepler_solver.time_limit_seconds == 0 {
            result.add_error("kepler.time_limit_seconds", "must be positive");
        }

        if self.export.enabled && self.export.max_export_kw < 0.0 {
            result.add_error("export.max_export_kw", "must be non-negative");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SystemConfig {
        SystemConfig {
            battery: BatteryConfig {
                capacity_kwh: 10.0,
                min_soc_percent: 10.0,
                max_soc_percent: 90.0,
                max_charge_kw: 5.0,
                max_discharge_kw: 5.0,
                roundtrip_efficiency: 0.9,
                default_wac_sek_per_kwh: 1.0,
            },
            horizon: HorizonConfig::default(),
            scheduler: SchedulerConfig::default(),
            executor: ExecutorConfig::default(),
            water_heater: WaterHeaterConfig::default(),
            kepler_solver: KeplerSolverConfig::default(),
            vacation: VacationConfig::default(),
            export: ExportConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().valid);
    }

    #[test]
    fn rejects_min_soc_above_max_soc() {
        let mut cfg = valid_config();
        cfg.battery.min_soc_percent = 95.0;
        let result = cfg.validate();
        assert!(!result.valid);
        assert!(result.has_errors());
    }

    #[test]
    fn rejects_zero_capacity() {
        let mut cfg = valid_config();
        cfg.battery.capacity_kwh = 0.0;
        assert!(!cfg.validate().valid);
    }

    #[test]
    fn horizon_slot_count_matches_quarter_hours() {
        let horizon = HorizonConfig {
            hours: 48,
            slot_minutes: 15,
        };
        assert_eq!(horizon.slot_count(), 192);
    }
}
