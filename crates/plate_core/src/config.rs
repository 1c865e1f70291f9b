//! # Generator Configuration
//!
//! All tuning constants of the board pipeline live here.
//!
//! ## Usage
//! ```rust
//! use plate_core::config::GeneratorConfig;
//!
//! let config = GeneratorConfig::default();
//! let casual = GeneratorConfig::casual();
//! assert!(casual.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::{env, fs};

use crate::board::core_zone::CoreSizeRule;
use crate::board::params::{validate_target_rate, validate_temperature};
use crate::error::{PlateError, Result};

pub const CONFIG_PATH_ENV: &str = "PLATE_CONFIG_PATH";

/// Numeric knobs of the difficulty calibrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Probabilities are clamped into `[epsilon, 1 - epsilon]` (default: 1e-6)
    pub epsilon: f64,
    /// Weight of the requested target rate against the raw non-core mean (default: 0.6)
    pub blend_weight: f64,
    /// Lowest allowed non-core target (default: 0.10)
    pub target_floor: f64,
    /// Highest allowed non-core target (default: 0.45)
    pub target_ceiling: f64,
    /// Log-odds shift search interval (default: -8..8)
    pub shift_min: f64,
    pub shift_max: f64,
    /// Bisection steps (default: 30)
    pub iterations: u32,
    /// Allowed gap between achieved and target mean before a warning (default: 1e-3)
    pub tolerance: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            blend_weight: 0.6,
            target_floor: 0.10,
            target_ceiling: 0.45,
            shift_min: -8.0,
            shift_max: 8.0,
            iterations: 30,
            tolerance: 1e-3,
        }
    }
}

/// Default target for boards up to `max_area` cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaTarget {
    pub max_area: usize,
    pub rate: f64,
}

/// Values used when a request leaves a parameter out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    /// Non-core sharpening temperature (default: 1.8)
    pub temperature: f64,
    /// Minimum non-core failures (default: 1)
    pub min_failures: usize,
    /// Area-tiered target rates, checked in order
    pub area_targets: Vec<AreaTarget>,
    /// Target for boards larger than every tier (default: 0.30)
    pub large_board_target: f64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            temperature: 1.8,
            min_failures: 1,
            area_targets: vec![
                AreaTarget { max_area: 16, rate: 0.15 },
                AreaTarget { max_area: 36, rate: 0.25 },
            ],
            large_board_target: 0.30,
        }
    }
}

impl RequestDefaults {
    pub fn target_rate_for_area(&self, area: usize) -> f64 {
        self.area_targets
            .iter()
            .find(|tier| area <= tier.max_area)
            .map(|tier| tier.rate)
            .unwrap_or(self.large_board_target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneratorConfig {
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub core_rule: CoreSizeRule,
    #[serde(default)]
    pub defaults: RequestDefaults,
}

impl GeneratorConfig {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Flatter boards with fewer scraps.
    pub fn casual() -> Self {
        let mut cfg = Self::default();
        cfg.calibration.target_floor = 0.08;
        cfg.calibration.target_ceiling = 0.30;
        cfg.defaults.temperature = 1.2;
        cfg.defaults.area_targets = vec![
            AreaTarget { max_area: 16, rate: 0.10 },
            AreaTarget { max_area: 36, rate: 0.18 },
        ];
        cfg.defaults.large_board_target = 0.22;
        cfg
    }

    /// Sharper boards with more scraps.
    pub fn hardcore() -> Self {
        let mut cfg = Self::default();
        cfg.calibration.target_ceiling = 0.50;
        cfg.defaults.temperature = 2.4;
        cfg.defaults.min_failures = 2;
        cfg.defaults.area_targets = vec![
            AreaTarget { max_area: 16, rate: 0.20 },
            AreaTarget { max_area: 36, rate: 0.30 },
        ];
        cfg.defaults.large_board_target = 0.38;
        cfg
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "standard" => Ok(Self::standard()),
            "casual" => Ok(Self::casual()),
            "hardcore" => Ok(Self::hardcore()),
            other => Err(PlateError::invalid(format!(
                "unknown preset {other:?} (expected standard, casual or hardcore)"
            ))),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `PLATE_CONFIG_PATH`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PlateError::invalid(format!("failed to read config from {CONFIG_PATH_ENV}='{path}': {e}"))
        })?;

        Self::from_json(&content).map_err(|e| {
            PlateError::invalid(format!("invalid config from {CONFIG_PATH_ENV}='{path}': {e}"))
        })
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.calibration;
        if !(c.epsilon > 0.0 && c.epsilon < 0.5) {
            return Err(PlateError::invalid(format!("epsilon must be in (0, 0.5), got {}", c.epsilon)));
        }
        if !(0.0..=1.0).contains(&c.blend_weight) {
            return Err(PlateError::invalid(format!(
                "blend_weight must be in [0, 1], got {}",
                c.blend_weight
            )));
        }
        if !(c.target_floor > 0.0 && c.target_floor <= c.target_ceiling && c.target_ceiling < 1.0) {
            return Err(PlateError::invalid(format!(
                "target band must satisfy 0 < floor <= ceiling < 1, got [{}, {}]",
                c.target_floor, c.target_ceiling
            )));
        }
        if !(c.shift_min < c.shift_max) || !c.shift_min.is_finite() || !c.shift_max.is_finite() {
            return Err(PlateError::invalid(format!(
                "shift range is empty: [{}, {}]",
                c.shift_min, c.shift_max
            )));
        }
        if c.iterations == 0 {
            return Err(PlateError::invalid("iterations must be at least 1"));
        }
        if !(c.tolerance > 0.0) {
            return Err(PlateError::invalid(format!("tolerance must be positive, got {}", c.tolerance)));
        }

        validate_temperature(self.defaults.temperature)?;
        validate_target_rate(self.defaults.large_board_target)?;
        for tier in &self.defaults.area_targets {
            validate_target_rate(tier.rate)?;
        }
        Ok(())
    }
}
