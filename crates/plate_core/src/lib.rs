//! # plate_core - Difficulty-Calibrated Build Plate Boards
//!
//! Turns a classifier's raw scrap-probability map for a build plate into a
//! playable board: randomized orientation, a protected core that never gets
//! harder than the model predicted, a non-core region rescaled toward a
//! target failure rate, and a guaranteed minimum number of scraps.
//!
//! ## Features
//! - Deterministic given the RNG (same seed = same board)
//! - Injectable probability source (model artifact or fixed stubs)
//! - JSON API for a thin HTTP or game-engine layer
//!
//! ```rust
//! use plate_core::{BoardGenerator, BoardParams, Geometry, GeneratorConfig, PowderCategory, UniformSource};
//! use rand::SeedableRng;
//!
//! let generator = BoardGenerator::new(UniformSource(0.2), GeneratorConfig::default());
//! let params = BoardParams::new(Geometry::square(7)?, PowderCategory::Virgin, false, 1.8, Some(0.33), 1)?;
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
//! let result = generator.generate(&params, &mut rng)?;
//! assert!(result.non_core_failures >= result.required_failures);
//! # Ok::<(), plate_core::PlateError>(())
//! ```

// Loop style - grid code indexes rows and columns explicitly
#![allow(clippy::needless_range_loop)]

pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod model;

#[cfg(test)]
pub(crate) mod proptest_gen;

pub use api::{generate_board, generate_board_json, BoardRequest, BoardResponse};
pub use board::{
    compute_core, BatchSummary, BoardGenerator, BoardParams, BoardResult, CoreSizeRule,
    DifficultyCalibrator, SpatialTransform,
};
pub use config::GeneratorConfig;
pub use error::{PlateError, Result};
pub use geometry::{Geometry, PowderCategory};
pub use grid::{CoreMask, Grid, ProbabilityMatrix};
pub use model::{FixedSource, LazyModelSource, ProbabilitySource, ScrapModel, UniformSource};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
