//! Row-major 2D grid
//!
//! Shared container for probability maps, core masks and sampled boards,
//! plus the shape-level transforms used by spatial randomization.

use crate::error::{PlateError, Result};

/// Dense `rows × cols` grid stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

/// Per-cell scrap probabilities.
pub type ProbabilityMatrix = Grid<f64>;

/// `true` marks a protected core cell.
pub type CoreMask = Grid<bool>;

impl<T: Clone> Grid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self { rows, cols, cells: vec![value; rows * cols] }
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut cells = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(PlateError::invalid(format!(
                    "ragged grid: row {i} has {} cells, expected {n_cols}",
                    row.len()
                )));
            }
            cells.extend(row);
        }
        Ok(Self { rows: n_rows, cols: n_cols, cells })
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.cols).map(<[T]>::to_vec).collect()
    }

    /// Counter-clockwise quarter turn; a `rows × cols` grid becomes `cols × rows`.
    pub fn rotate_90(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self[(j, self.cols - 1 - i)].clone())
    }

    pub fn rotate_180(&self) -> Self {
        Self::from_fn(self.rows, self.cols, |i, j| {
            self[(self.rows - 1 - i, self.cols - 1 - j)].clone()
        })
    }

    pub fn rotate_270(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self[(self.rows - 1 - j, i)].clone())
    }

    /// Upside-down mirror (row order reversed).
    pub fn flip_vertical(&self) -> Self {
        Self::from_fn(self.rows, self.cols, |i, j| self[(self.rows - 1 - i, j)].clone())
    }

    /// Left-right mirror (column order reversed).
    pub fn flip_horizontal(&self) -> Self {
        Self::from_fn(self.rows, self.cols, |i, j| self[(i, self.cols - 1 - j)].clone())
    }
}

impl<T> Grid<T> {
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                cells.push(f(i, j));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Flat row-major view.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// `(row, col, value)` triples in row-major order.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().map(move |(k, v)| (k / cols, k % cols, v))
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid { rows: self.rows, cols: self.cols, cells: self.cells.iter().map(f).collect() }
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "grid index ({row}, {col}) out of bounds");
        &self.cells[row * self.cols + col]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "grid index ({row}, {col}) out of bounds");
        &mut self.cells[row * self.cols + col]
    }
}

impl ProbabilityMatrix {
    /// Arithmetic mean of all cells; `0.0` for an empty grid.
    pub fn mean(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().sum::<f64>() / self.cells.len() as f64
    }
}

impl CoreMask {
    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|&&b| b).count()
    }

    pub fn count_false(&self) -> usize {
        self.cells.len() - self.count_true()
    }

    /// Mask rendered as nested 0/1 rows.
    pub fn to_binary_rows(&self) -> Vec<Vec<u8>> {
        self.map(|&b| u8::from(b)).to_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_2x3() -> Grid<u32> {
        // 1 2 3
        // 4 5 6
        Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap()
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Grid::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(err.code(), "invalid_parameter");
    }

    #[test]
    fn test_rotate_90_counter_clockwise() {
        let g = sample_2x3().rotate_90();
        assert_eq!(g.shape(), (3, 2));
        assert_eq!(g.to_rows(), vec![vec![3, 6], vec![2, 5], vec![1, 4]]);
    }

    #[test]
    fn test_rotate_270_clockwise() {
        let g = sample_2x3().rotate_270();
        assert_eq!(g.to_rows(), vec![vec![4, 1], vec![5, 2], vec![6, 3]]);
    }

    #[test]
    fn test_rotate_180() {
        let g = sample_2x3().rotate_180();
        assert_eq!(g.to_rows(), vec![vec![6, 5, 4], vec![3, 2, 1]]);
    }

    #[test]
    fn test_quarter_turns_compose() {
        let g = sample_2x3();
        assert_eq!(g.rotate_90().rotate_90(), g.rotate_180());
        assert_eq!(g.rotate_90().rotate_270(), g);
    }

    #[test]
    fn test_flips() {
        let g = sample_2x3();
        assert_eq!(g.flip_vertical().to_rows(), vec![vec![4, 5, 6], vec![1, 2, 3]]);
        assert_eq!(g.flip_horizontal().to_rows(), vec![vec![3, 2, 1], vec![6, 5, 4]]);
        assert_eq!(g.flip_vertical().flip_vertical(), g);
    }

    #[test]
    fn test_indexed_and_get() {
        let g = sample_2x3();
        let triples: Vec<_> = g.indexed().map(|(r, c, v)| (r, c, *v)).collect();
        assert_eq!(triples[4], (1, 1, 5));
        assert_eq!(g.get(1, 2), Some(&6));
        assert_eq!(g.get(2, 0), None);
    }

    #[test]
    fn test_mask_counts_and_mean() {
        let mask = Grid::from_fn(3, 3, |i, j| i == 1 && j == 1);
        assert_eq!(mask.count_true(), 1);
        assert_eq!(mask.count_false(), 8);
        assert_eq!(mask.to_binary_rows()[1], vec![0, 1, 0]);

        let p = Grid::filled(2, 2, 0.25);
        assert!((p.mean() - 0.25).abs() < 1e-12);
    }
}
