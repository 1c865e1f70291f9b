//! Board generation pipeline
//!
//! source → spatial randomization → core mask → calibration → sampling.
//! Randomness comes only from the caller's RNG: one draw for the transform,
//! then one per cell.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::calibrator::DifficultyCalibrator;
use super::core_zone::compute_core;
use super::params::BoardParams;
use super::sampler::BoardSampler;
use super::transform::{randomize, SpatialTransform};
use crate::config::GeneratorConfig;
use crate::error::{PlateError, Result};
use crate::geometry::{Geometry, PowderCategory};
use crate::grid::{CoreMask, Grid, ProbabilityMatrix};
use crate::model::ProbabilitySource;

/// One generated plate with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardResult {
    pub geometry: Geometry,
    pub powder: PowderCategory,
    pub annealed: bool,
    /// 0 = safe, 1 = scrap
    pub board: Grid<u8>,
    pub core: CoreMask,
    pub transform: SpatialTransform,
    /// Effective non-core target; `None` on a plate without non-core cells.
    pub target_nc: Option<f64>,
    pub forced: bool,
    /// Mean raw model probability.
    pub mean_prob: f64,
    pub required_failures: usize,
    pub non_core_failures: usize,
    pub total_failures: usize,
}

pub struct BoardGenerator<S> {
    source: S,
    config: GeneratorConfig,
    calibrator: DifficultyCalibrator,
    sampler: BoardSampler,
}

impl<S: ProbabilitySource> BoardGenerator<S> {
    pub fn new(source: S, config: GeneratorConfig) -> Self {
        let calibrator = DifficultyCalibrator::new(config.calibration.clone());
        Self { source, config, calibrator, sampler: BoardSampler::new() }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn generate<R: Rng + ?Sized>(&self, params: &BoardParams, rng: &mut R) -> Result<BoardResult> {
        let geometry = params.geometry();
        let raw = self.source.predict(geometry, params.powder(), params.annealed())?;
        check_source_map(&raw, geometry)?;
        let mean_prob = raw.mean();

        let (raw, transform) = randomize(&raw, rng);
        let core = compute_core(geometry.rows(), geometry.cols(), self.config.core_rule);

        let target_rate = params.resolved_target_rate(&self.config.defaults);
        let calibration = self.calibrator.calibrate(&raw, &core, params.temperature(), target_rate);
        let sampled = self.sampler.sample(&calibration, &core, params.min_failures(), rng);

        debug!(
            rows = geometry.rows(),
            cols = geometry.cols(),
            transform = transform.as_str(),
            forced = sampled.forced,
            failures = sampled.total_failures,
            "board generated"
        );

        Ok(BoardResult {
            geometry,
            powder: params.powder(),
            annealed: params.annealed(),
            board: sampled.cells,
            core,
            transform,
            target_nc: calibration.target_nc,
            forced: sampled.forced,
            mean_prob,
            required_failures: sampled.required_failures,
            non_core_failures: sampled.non_core_failures,
            total_failures: sampled.total_failures,
        })
    }

    /// One board per seed, generated in parallel, returned in seed order.
    pub fn generate_batch(&self, params: &BoardParams, seeds: &[u64]) -> Vec<Result<BoardResult>> {
        seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                self.generate(params, &mut rng)
            })
            .collect()
    }
}

/// Reject maps the source should never have produced.
fn check_source_map(map: &ProbabilityMatrix, geometry: Geometry) -> Result<()> {
    if map.shape() != (geometry.rows(), geometry.cols()) {
        return Err(PlateError::InferenceError(format!(
            "source returned {}x{} map for {}x{} plate",
            map.rows(),
            map.cols(),
            geometry.rows(),
            geometry.cols()
        )));
    }
    if let Some((i, j, p)) = map.indexed().find(|(_, _, p)| !(0.0..=1.0).contains(*p)) {
        return Err(PlateError::InferenceError(format!("probability {p} at ({i}, {j}) is not in [0, 1]")));
    }
    Ok(())
}

/// Aggregate view of a batch, for tuning presets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub boards: usize,
    pub errors: usize,
    pub mean_failure_rate: f64,
    pub mean_non_core_failure_rate: f64,
    pub forced_share: f64,
    pub mean_target_nc: Option<f64>,
    pub mean_raw_prob: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[Result<BoardResult>]) -> Self {
        let boards: Vec<&BoardResult> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let errors = results.len() - boards.len();
        let n = boards.len().max(1) as f64;

        let mean_failure_rate =
            boards.iter().map(|b| b.total_failures as f64 / b.board.len() as f64).sum::<f64>() / n;
        let mean_non_core_failure_rate = boards
            .iter()
            .map(|b| {
                let nc = b.core.count_false().max(1);
                b.non_core_failures as f64 / nc as f64
            })
            .sum::<f64>()
            / n;
        let forced_share = boards.iter().filter(|b| b.forced).count() as f64 / n;
        let targets: Vec<f64> = boards.iter().filter_map(|b| b.target_nc).collect();
        let mean_target_nc =
            (!targets.is_empty()).then(|| targets.iter().sum::<f64>() / targets.len() as f64);
        let mean_raw_prob = boards.iter().map(|b| b.mean_prob).sum::<f64>() / n;

        Self {
            boards: boards.len(),
            errors,
            mean_failure_rate,
            mean_non_core_failure_rate,
            forced_share,
            mean_target_nc,
            mean_raw_prob,
        }
    }
}
