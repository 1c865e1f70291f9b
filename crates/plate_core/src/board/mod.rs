//! Difficulty-calibrated board generation
//!
//! This module provides:
//! - Core zone (protected center of the plate)
//! - Spatial randomization of the raw probability map
//! - Difficulty calibrator (temperature sharpening + log-odds shift search)
//! - Board sampler (Bernoulli draw + forced completion)
//! - Pipeline tying the stages to a probability source

pub mod calibrator;
pub mod core_zone;
pub mod params;
pub mod pipeline;
pub mod sampler;
pub mod transform;

pub use calibrator::{logit, non_core_mean, sigmoid, Calibration, DifficultyCalibrator};
pub use core_zone::{compute_core, CoreSizeRule, CoreZone};
pub use params::{
    validate_target_rate, validate_temperature, BoardParams, TARGET_RATE_MAX, TARGET_RATE_MIN,
    TEMPERATURE_MAX, TEMPERATURE_MIN,
};
pub use pipeline::{BatchSummary, BoardGenerator, BoardResult};
pub use sampler::{required_failures, BoardSampler, SampledBoard, SAFE, SCRAP};
pub use transform::{randomize, SpatialTransform};
