//! Difficulty Calibrator - Rescales Non-Core Risk Toward a Target Rate
//!
//! Pipeline on one probability map:
//! 1. clamp into `[eps, 1 - eps]`
//! 2. sharpen non-core cells with `p^(1/temperature)`
//! 3. blend the requested rate with the raw non-core mean into `target_nc`
//! 4. bisect an additive log-odds shift so the non-core mean hits `target_nc`
//! 5. cap every core cell at its raw prediction
//!
//! The core cap in step 5 is what keeps the center of the plate from ever
//! becoming harder than the model predicted.

use tracing::{debug, warn};

use crate::config::CalibrationConfig;
use crate::grid::{CoreMask, ProbabilityMatrix};

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Calibrated map plus the numbers that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub probabilities: ProbabilityMatrix,
    /// Non-core target mean; `None` when the plate has no non-core cells.
    pub target_nc: Option<f64>,
    /// Log-odds shift applied to every cell.
    pub shift: f64,
    /// Mean of the clamped raw non-core probabilities.
    pub raw_nc_mean: Option<f64>,
    /// Non-core mean after calibration.
    pub achieved_nc_mean: Option<f64>,
}

impl Calibration {
    pub fn is_degenerate(&self) -> bool {
        self.target_nc.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DifficultyCalibrator {
    config: CalibrationConfig,
}

impl DifficultyCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    fn clamp(&self, p: f64) -> f64 {
        p.clamp(self.config.epsilon, 1.0 - self.config.epsilon)
    }

    /// Blend of the requested rate with the raw non-core mean, kept inside the target band.
    pub fn target_for(&self, raw_nc_mean: f64, target_rate: f64) -> f64 {
        let w = self.config.blend_weight;
        (w * target_rate + (1.0 - w) * raw_nc_mean)
            .clamp(self.config.target_floor, self.config.target_ceiling)
    }

    /// Calibrate `raw` against `core`.
    ///
    /// `temperature` must already be validated as positive; `core` must have
    /// the same shape as `raw`.
    pub fn calibrate(
        &self,
        raw: &ProbabilityMatrix,
        core: &CoreMask,
        temperature: f64,
        target_rate: f64,
    ) -> Calibration {
        debug_assert_eq!(raw.shape(), core.shape());

        let clamped = raw.map(|&p| self.clamp(p));
        let non_core: Vec<usize> = core
            .iter()
            .enumerate()
            .filter_map(|(k, &is_core)| (!is_core).then_some(k))
            .collect();

        if non_core.is_empty() {
            debug!("no non-core cells, sampling from clamped raw map");
            return Calibration {
                probabilities: clamped,
                target_nc: None,
                shift: 0.0,
                raw_nc_mean: None,
                achieved_nc_mean: None,
            };
        }

        let mut sharpened = clamped.clone();
        let exponent = 1.0 / temperature;
        for &k in &non_core {
            let cell = &mut sharpened.cells_mut()[k];
            *cell = self.clamp(cell.powf(exponent));
        }

        let raw_nc_mean = mean_at(clamped.cells(), &non_core);
        let target_nc = self.target_for(raw_nc_mean, target_rate);

        let logits = sharpened.map(|&p| logit(p));
        let shift = self.search_shift(logits.cells(), &non_core, target_nc);

        let mut adjusted = logits.map(|&l| sigmoid(l + shift));
        for ((p, &is_core), &raw_p) in adjusted.cells_mut().iter_mut().zip(core.iter()).zip(raw.iter()) {
            if is_core {
                *p = p.min(raw_p);
            }
        }

        let achieved = mean_at(adjusted.cells(), &non_core);
        if (achieved - target_nc).abs() > self.config.tolerance {
            warn!(
                target_nc,
                achieved,
                shift,
                "non-core target unreachable within shift range"
            );
        }
        debug!(temperature, target_rate, raw_nc_mean, target_nc, shift, achieved, "calibrated");

        Calibration {
            probabilities: adjusted,
            target_nc: Some(target_nc),
            shift,
            raw_nc_mean: Some(raw_nc_mean),
            achieved_nc_mean: Some(achieved),
        }
    }

    /// Bisection over the shift interval. The non-core mean is monotone
    /// increasing in the shift, so the bracket always keeps the target.
    fn search_shift(&self, logits: &[f64], non_core: &[usize], target: f64) -> f64 {
        let mut lo = self.config.shift_min;
        let mut hi = self.config.shift_max;
        for _ in 0..self.config.iterations {
            let mid = 0.5 * (lo + hi);
            let mean = non_core.iter().map(|&k| sigmoid(logits[k] + mid)).sum::<f64>()
                / non_core.len() as f64;
            if mean < target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

fn mean_at(cells: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&k| cells[k]).sum::<f64>() / indices.len() as f64
}

/// Mean over the cells where `core` is false; `None` when there are none.
pub fn non_core_mean(probabilities: &ProbabilityMatrix, core: &CoreMask) -> Option<f64> {
    let (sum, n) = probabilities
        .iter()
        .zip(core.iter())
        .filter(|(_, &is_core)| !is_core)
        .fold((0.0, 0usize), |(s, n), (&p, _)| (s + p, n + 1));
    (n > 0).then(|| sum / n as f64)
}
