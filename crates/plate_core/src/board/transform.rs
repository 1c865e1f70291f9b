//! Spatial randomization
//!
//! Random flip/rotate of the raw probability map so that players cannot learn
//! a fixed spatial bias of the classifier.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialTransform {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipVertical,
    FlipHorizontal,
}

impl SpatialTransform {
    pub const ALL: [SpatialTransform; 6] = [
        SpatialTransform::Identity,
        SpatialTransform::Rotate90,
        SpatialTransform::Rotate180,
        SpatialTransform::Rotate270,
        SpatialTransform::FlipVertical,
        SpatialTransform::FlipHorizontal,
    ];

    /// Quarter turns swap the sides of a rectangular grid.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, SpatialTransform::Rotate90 | SpatialTransform::Rotate270)
    }

    pub fn apply<T: Clone>(&self, grid: &Grid<T>) -> Grid<T> {
        match self {
            SpatialTransform::Identity => grid.clone(),
            SpatialTransform::Rotate90 => grid.rotate_90(),
            SpatialTransform::Rotate180 => grid.rotate_180(),
            SpatialTransform::Rotate270 => grid.rotate_270(),
            SpatialTransform::FlipVertical => grid.flip_vertical(),
            SpatialTransform::FlipHorizontal => grid.flip_horizontal(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpatialTransform::Identity => "identity",
            SpatialTransform::Rotate90 => "rotate_90",
            SpatialTransform::Rotate180 => "rotate_180",
            SpatialTransform::Rotate270 => "rotate_270",
            SpatialTransform::FlipVertical => "flip_vertical",
            SpatialTransform::FlipHorizontal => "flip_horizontal",
        }
    }
}

/// Pick one of the six transforms uniformly and apply it.
///
/// Consumes exactly one draw from `rng`. A quarter turn on a non-square grid
/// would change its shape, so it degrades to identity; the transform actually
/// applied is returned alongside the grid.
pub fn randomize<T: Clone, R: Rng + ?Sized>(
    grid: &Grid<T>,
    rng: &mut R,
) -> (Grid<T>, SpatialTransform) {
    let drawn = SpatialTransform::ALL[rng.gen_range(0..SpatialTransform::ALL.len())];
    let applied = if drawn.swaps_axes() && grid.rows() != grid.cols() {
        debug!(
            drawn = drawn.as_str(),
            rows = grid.rows(),
            cols = grid.cols(),
            "quarter turn on rectangular plate, keeping orientation"
        );
        SpatialTransform::Identity
    } else {
        drawn
    };
    (applied.apply(grid), applied)
}
