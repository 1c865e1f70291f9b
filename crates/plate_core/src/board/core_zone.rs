//! Core zone
//!
//! The centered square of the plate whose scrap risk may never be raised above
//! the model's raw prediction. Depends on geometry only.

use serde::{Deserialize, Serialize};

use crate::grid::{CoreMask, Grid};

/// How the core side length is derived from `min(rows, cols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreSizeRule {
    /// `>= 7 → 3`, `5..7 → 2`, otherwise `1`.
    #[default]
    Tiered,
    /// Historical per-size lookup, `3:1 4:2 5:3 6:4 7:3 8:6 9:5 10:6 11:7`.
    LegacyTable,
}

impl CoreSizeRule {
    /// Core side length, never larger than the shorter board side.
    pub fn side(&self, rows: usize, cols: usize) -> usize {
        let n = rows.min(cols);
        let k = match self {
            CoreSizeRule::Tiered => {
                if n >= 7 {
                    3
                } else if n >= 5 {
                    2
                } else {
                    1
                }
            }
            CoreSizeRule::LegacyTable => match n {
                3 => 1,
                4 => 2,
                5 => 3,
                6 => 4,
                7 => 3,
                8 => 6,
                9 => 5,
                10 => 6,
                11 => 7,
                _ => ((n / 2) | 1).max(1),
            },
        };
        k.min(n)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoreSizeRule::Tiered => "tiered",
            CoreSizeRule::LegacyTable => "legacy_table",
        }
    }
}

/// Placement of the core square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreZone {
    pub row_start: usize,
    pub col_start: usize,
    pub row_end: usize,
    pub col_end: usize,
}

impl CoreZone {
    pub fn locate(rows: usize, cols: usize, rule: CoreSizeRule) -> Self {
        let k = rule.side(rows, cols);
        let row_start = (rows / 2).saturating_sub(k / 2);
        let col_start = (cols / 2).saturating_sub(k / 2);
        Self {
            row_start,
            col_start,
            row_end: (row_start + k).min(rows),
            col_end: (col_start + k).min(cols),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..self.row_end).contains(&row) && (self.col_start..self.col_end).contains(&col)
    }

    pub fn cell_count(&self) -> usize {
        (self.row_end - self.row_start) * (self.col_end - self.col_start)
    }
}

pub fn compute_core(rows: usize, cols: usize, rule: CoreSizeRule) -> CoreMask {
    let zone = CoreZone::locate(rows, cols, rule);
    Grid::from_fn(rows, cols, |i, j| zone.contains(i, j))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tiered_sides() {
        let rule = CoreSizeRule::Tiered;
        assert_eq!(rule.side(3, 3), 1);
        assert_eq!(rule.side(4, 11), 1);
        assert_eq!(rule.side(5, 5), 2);
        assert_eq!(rule.side(6, 9), 2);
        assert_eq!(rule.side(7, 7), 3);
        assert_eq!(rule.side(11, 11), 3);
    }

    #[test]
    fn test_legacy_table_sides() {
        let rule = CoreSizeRule::LegacyTable;
        let expected = [(3, 1), (4, 2), (5, 3), (6, 4), (7, 3), (8, 6), (9, 5), (10, 6), (11, 7)];
        for (n, k) in expected {
            assert_eq!(rule.side(n, n), k, "n = {n}");
        }
    }

    #[test]
    fn test_zero_side_is_empty() {
        assert_eq!(CoreSizeRule::Tiered.side(0, 5), 0);
        let mask = compute_core(0, 5, CoreSizeRule::Tiered);
        assert_eq!(mask.count_true(), 0);
    }

    #[test]
    fn test_seven_by_seven_core() {
        let mask = compute_core(7, 7, CoreSizeRule::Tiered);
        assert_eq!(mask.count_true(), 9);
        assert_eq!(mask.count_false(), 40);
        for i in 0..7 {
            for j in 0..7 {
                let expected = (2..5).contains(&i) && (2..5).contains(&j);
                assert_eq!(mask[(i, j)], expected, "cell ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_three_by_three_core_is_center() {
        let mask = compute_core(3, 3, CoreSizeRule::Tiered);
        assert_eq!(mask.count_true(), 1);
        assert!(mask[(1, 1)]);
    }

    #[test]
    fn test_rectangular_core() {
        let zone = CoreZone::locate(5, 10, CoreSizeRule::Tiered);
        assert_eq!(zone, CoreZone { row_start: 1, col_start: 4, row_end: 3, col_end: 6 });
    }

    fn assert_centered(rows: usize, cols: usize, rule: CoreSizeRule) {
        let k = rule.side(rows, cols);
        let mask = compute_core(rows, cols, rule);
        assert_eq!(mask.count_true(), k * k);

        let zone = CoreZone::locate(rows, cols, rule);
        assert!(zone.row_end <= rows && zone.col_end <= cols);
        let top = zone.row_start as isize;
        let bottom = (rows - zone.row_end) as isize;
        let left = zone.col_start as isize;
        let right = (cols - zone.col_end) as isize;
        assert!((top - bottom).abs() <= 1, "rows {rows}: top {top} bottom {bottom}");
        assert!((left - right).abs() <= 1, "cols {cols}: left {left} right {right}");
    }

    proptest! {
        #[test]
        fn prop_core_is_centered_square(rows in 3usize..=11, cols in 3usize..=11) {
            assert_centered(rows, cols, CoreSizeRule::Tiered);
            assert_centered(rows, cols, CoreSizeRule::LegacyTable);
        }

        #[test]
        fn prop_core_is_pure(rows in 3usize..=11, cols in 3usize..=11) {
            prop_assert_eq!(
                compute_core(rows, cols, CoreSizeRule::Tiered),
                compute_core(rows, cols, CoreSizeRule::Tiered)
            );
        }
    }
}
