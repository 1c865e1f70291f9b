//! Scrap probability model
//!
//! The classifier that turns plate geometry and build inputs into a raw
//! probability map, and the [`ProbabilitySource`] seam the board pipeline
//! consumes it through.

pub mod features;
pub mod scrap_model;
pub mod source;

pub use features::{feature_grid, CellFeatures};
pub use scrap_model::{ScrapModel, MODEL_TYPE};
pub use source::{
    resolve_model_path, FixedSource, LazyModelSource, ProbabilitySource, UniformSource,
    DEFAULT_MODEL_REL_PATH, MODEL_PATH_ENV,
};
