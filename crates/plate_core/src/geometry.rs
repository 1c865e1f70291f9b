//! Plate geometry and categorical build inputs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlateError, Result};

/// Smallest allowed side length.
pub const MIN_SIDE: usize = 3;
/// Largest allowed side length.
pub const MAX_SIDE: usize = 11;

/// Validated board dimensions, each side in `MIN_SIDE..=MAX_SIDE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Geometry {
    rows: usize,
    cols: usize,
}

impl Geometry {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        check_side("rows", rows)?;
        check_side("cols", cols)?;
        Ok(Self { rows, cols })
    }

    pub fn square(side: usize) -> Result<Self> {
        Self::new(side, side)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    pub fn min_side(&self) -> usize {
        self.rows.min(self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }
}

fn check_side(name: &str, value: usize) -> Result<()> {
    if (MIN_SIDE..=MAX_SIDE).contains(&value) {
        Ok(())
    } else {
        Err(PlateError::invalid(format!(
            "{name} must be in {MIN_SIDE}..={MAX_SIDE}, got {value}"
        )))
    }
}

/// Powder feedstock used for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowderCategory {
    Virgin,
    Recycled,
}

impl PowderCategory {
    pub const ALL: [PowderCategory; 2] = [PowderCategory::Virgin, PowderCategory::Recycled];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowderCategory::Virgin => "Virgin",
            PowderCategory::Recycled => "Recycled",
        }
    }
}

impl FromStr for PowderCategory {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Virgin" => Ok(PowderCategory::Virgin),
            "Recycled" => Ok(PowderCategory::Recycled),
            other => Err(PlateError::invalid(format!(
                "powder must be \"Virgin\" or \"Recycled\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for PowderCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thermal-annealing flag as carried on the wire (0 or 1).
pub fn annealing_from_flag(flag: u8) -> Result<bool> {
    match flag {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(PlateError::invalid(format!("ta must be 0 or 1, got {other}"))),
    }
}
