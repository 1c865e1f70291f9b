//! Per-cell classifier inputs
//!
//! Positions are scaled to `[0, 1]` along each axis so one model serves every
//! plate size.

use crate::geometry::Geometry;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFeatures {
    /// Scaled row, `i / (rows - 1)`
    pub r: f64,
    /// Scaled column, `j / (cols - 1)`
    pub c: f64,
    /// Distance to the nearest plate edge in scaled units
    pub dist_edge_min: f64,
    /// Euclidean distance to the plate center in scaled units
    pub dist_center: f64,
}

impl CellFeatures {
    pub fn at(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        let r = row as f64 / (rows.saturating_sub(1).max(1)) as f64;
        let c = col as f64 / (cols.saturating_sub(1).max(1)) as f64;
        let dist_edge_min = r.min(c).min(1.0 - r).min(1.0 - c);
        let dist_center = ((r - 0.5).powi(2) + (c - 0.5).powi(2)).sqrt();
        Self { r, c, dist_edge_min, dist_center }
    }
}

pub fn feature_grid(geometry: Geometry) -> Grid<CellFeatures> {
    let (rows, cols) = (geometry.rows(), geometry.cols());
    Grid::from_fn(rows, cols, |i, j| CellFeatures::at(i, j, rows, cols))
}
