//! Board sampler
//!
//! One Bernoulli draw per cell, then a deterministic highest-risk-first
//! completion when the draw falls short of the failure requirement.

use rand::Rng;
use tracing::{debug, warn};

use super::calibrator::Calibration;
use crate::grid::{CoreMask, Grid, ProbabilityMatrix};

pub const SAFE: u8 = 0;
pub const SCRAP: u8 = 1;

/// Guard against `0.3 * 10.0 == 3.0000000000000004` style round-up.
const CEIL_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct SampledBoard {
    /// `SAFE` / `SCRAP` per cell.
    pub cells: Grid<u8>,
    /// Completion changed the random draw.
    pub forced: bool,
    /// Non-core requirement, or the whole-board floor on a plate without non-core cells.
    pub required_failures: usize,
    pub forced_cells: usize,
    pub non_core_failures: usize,
    pub total_failures: usize,
}

/// Non-core failures a board must carry: `max(ceil(target * n), min_failures)`,
/// never more than the `n` non-core cells available.
pub fn required_failures(target_nc: f64, non_core_count: usize, min_failures: usize) -> usize {
    let from_target = (target_nc * non_core_count as f64 - CEIL_SLACK).ceil().max(0.0) as usize;
    let required = from_target.max(min_failures);
    if required > non_core_count {
        warn!(
            required,
            non_core_count, "failure requirement exceeds non-core cells, capping"
        );
    }
    required.min(non_core_count)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardSampler;

impl BoardSampler {
    pub fn new() -> Self {
        Self
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        calibration: &Calibration,
        core: &CoreMask,
        min_failures: usize,
        rng: &mut R,
    ) -> SampledBoard {
        let probabilities = &calibration.probabilities;
        debug_assert_eq!(probabilities.shape(), core.shape());

        let mut cells = draw(probabilities, rng);

        let non_core: Vec<usize> = core
            .iter()
            .enumerate()
            .filter_map(|(k, &is_core)| (!is_core).then_some(k))
            .collect();

        let (required, forced_cells) = match calibration.target_nc {
            Some(target_nc) if !non_core.is_empty() => {
                let required = required_failures(target_nc, non_core.len(), min_failures);
                let have = non_core.iter().filter(|&&k| cells.cells()[k] == SCRAP).count();
                let forced = force_top(&mut cells, probabilities, &non_core, required.saturating_sub(have));
                (required, forced)
            }
            _ => {
                let all: Vec<usize> = (0..cells.len()).collect();
                let have = cells.iter().filter(|&&c| c == SCRAP).count();
                let forced = force_top(&mut cells, probabilities, &all, 1usize.saturating_sub(have));
                (1, forced)
            }
        };

        let total_failures = cells.iter().filter(|&&c| c == SCRAP).count();
        let non_core_failures = non_core.iter().filter(|&&k| cells.cells()[k] == SCRAP).count();
        debug!(required, forced_cells, non_core_failures, total_failures, "sampled board");

        SampledBoard {
            cells,
            forced: forced_cells > 0,
            required_failures: required,
            forced_cells,
            non_core_failures,
            total_failures,
        }
    }
}

fn draw<R: Rng + ?Sized>(probabilities: &ProbabilityMatrix, rng: &mut R) -> Grid<u8> {
    probabilities.map(|&p| if rng.gen::<f64>() < p { SCRAP } else { SAFE })
}

/// Flip the `deficit` most probable safe cells among `candidates` to scrap.
/// Ties keep row-major order. Returns how many cells were flipped.
fn force_top(
    cells: &mut Grid<u8>,
    probabilities: &ProbabilityMatrix,
    candidates: &[usize],
    deficit: usize,
) -> usize {
    if deficit == 0 {
        return 0;
    }
    let p = probabilities.cells();
    let mut safe: Vec<usize> = candidates.iter().copied().filter(|&k| cells.cells()[k] == SAFE).collect();
    safe.sort_by(|&a, &b| p[b].total_cmp(&p[a]));

    let flips = deficit.min(safe.len());
    for &k in &safe[..flips] {
        cells.cells_mut()[k] = SCRAP;
    }
    flips
}
