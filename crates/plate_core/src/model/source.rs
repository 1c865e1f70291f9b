//! Probability sources
//!
//! The pipeline only sees [`ProbabilitySource`]; the model artifact, its
//! location and its one-time loading stay behind this trait.

use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::scrap_model::ScrapModel;
use crate::error::{PlateError, Result};
use crate::geometry::{Geometry, PowderCategory};
use crate::grid::{Grid, ProbabilityMatrix};

/// Env var overriding the model artifact location.
pub const MODEL_PATH_ENV: &str = "PLATE_MODEL_PATH";

/// Default relative path used when `PLATE_MODEL_PATH` is not set.
pub const DEFAULT_MODEL_REL_PATH: &str = "artifacts/scrap_model.json";

/// Raw per-cell scrap probabilities for a plate.
///
/// Implementations must be deterministic in their inputs.
pub trait ProbabilitySource: Send + Sync {
    fn predict(
        &self,
        geometry: Geometry,
        powder: PowderCategory,
        annealed: bool,
    ) -> Result<ProbabilityMatrix>;
}

impl<S: ProbabilitySource + ?Sized> ProbabilitySource for &S {
    fn predict(&self, geometry: Geometry, powder: PowderCategory, annealed: bool) -> Result<ProbabilityMatrix> {
        (**self).predict(geometry, powder, annealed)
    }
}

impl<S: ProbabilitySource + ?Sized> ProbabilitySource for Arc<S> {
    fn predict(&self, geometry: Geometry, powder: PowderCategory, annealed: bool) -> Result<ProbabilityMatrix> {
        (**self).predict(geometry, powder, annealed)
    }
}

impl<S: ProbabilitySource + ?Sized> ProbabilitySource for Box<S> {
    fn predict(&self, geometry: Geometry, powder: PowderCategory, annealed: bool) -> Result<ProbabilityMatrix> {
        (**self).predict(geometry, powder, annealed)
    }
}

/// Same probability everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSource(pub f64);

impl ProbabilitySource for UniformSource {
    fn predict(&self, geometry: Geometry, _: PowderCategory, _: bool) -> Result<ProbabilityMatrix> {
        Ok(Grid::filled(geometry.rows(), geometry.cols(), self.0))
    }
}

/// A fixed map, returned as-is for its own geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSource(pub ProbabilityMatrix);

impl ProbabilitySource for FixedSource {
    fn predict(&self, geometry: Geometry, _: PowderCategory, _: bool) -> Result<ProbabilityMatrix> {
        if self.0.shape() != (geometry.rows(), geometry.cols()) {
            return Err(PlateError::InferenceError(format!(
                "fixed map is {}x{}, requested {}x{}",
                self.0.rows(),
                self.0.cols(),
                geometry.rows(),
                geometry.cols()
            )));
        }
        Ok(self.0.clone())
    }
}

/// Resolution order:
/// 1) `PLATE_MODEL_PATH` if set and non-empty
/// 2) `artifacts/scrap_model.json` (relative)
pub fn resolve_model_path() -> PathBuf {
    if let Ok(path) = env::var(MODEL_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_MODEL_REL_PATH)
}

/// Scrap model loaded on first use and kept for the life of the source.
///
/// Loading happens at most once successfully; a failed load is reported to
/// that caller and attempted again on the next prediction.
#[derive(Debug)]
pub struct LazyModelSource {
    path: PathBuf,
    model: OnceCell<ScrapModel>,
}

impl LazyModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), model: OnceCell::new() }
    }

    pub fn from_env() -> Self {
        Self::new(resolve_model_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn model(&self) -> Result<&ScrapModel> {
        self.model.get_or_try_init(|| ScrapModel::load(&self.path))
    }
}

impl ProbabilitySource for LazyModelSource {
    fn predict(&self, geometry: Geometry, powder: PowderCategory, annealed: bool) -> Result<ProbabilityMatrix> {
        self.model()?.predict_map(geometry, powder, annealed)
    }
}
