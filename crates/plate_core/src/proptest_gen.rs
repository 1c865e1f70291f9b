//! Property-based test generators
//!
//! Strategies for plate geometries and probability maps shared by the
//! calibration and sampling property tests.

use proptest::prelude::*;

use crate::grid::{Grid, ProbabilityMatrix};

pub fn side_strategy() -> impl Strategy<Value = usize> {
    3usize..=11
}

pub fn shape_strategy() -> impl Strategy<Value = (usize, usize)> {
    (side_strategy(), side_strategy())
}

/// Probability map of random shape with every cell drawn from `range`.
pub fn probability_matrix_strategy(
    range: std::ops::Range<f64>,
) -> impl Strategy<Value = ProbabilityMatrix> {
    shape_strategy().prop_flat_map(move |(rows, cols)| {
        prop::collection::vec(range.clone(), rows * cols)
            .prop_map(move |cells| Grid::from_fn(rows, cols, |i, j| cells[i * cols + j]))
    })
}

/// Sharpening temperature within the accepted request range.
pub fn temperature_strategy() -> impl Strategy<Value = f64> {
    0.11f64..=10.0
}

pub fn target_rate_strategy() -> impl Strategy<Value = f64> {
    0.051f64..=0.75
}
