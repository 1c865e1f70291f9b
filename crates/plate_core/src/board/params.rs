//! Validated board request parameters

use serde::Serialize;

use crate::config::RequestDefaults;
use crate::error::{PlateError, Result};
use crate::geometry::{Geometry, PowderCategory};

/// Exclusive lower bound on temperature.
pub const TEMPERATURE_MIN: f64 = 0.1;
pub const TEMPERATURE_MAX: f64 = 10.0;
/// Exclusive lower bound on the target rate.
pub const TARGET_RATE_MIN: f64 = 0.05;
pub const TARGET_RATE_MAX: f64 = 0.75;

pub fn validate_temperature(temperature: f64) -> Result<f64> {
    if temperature > TEMPERATURE_MIN && temperature <= TEMPERATURE_MAX {
        Ok(temperature)
    } else {
        Err(PlateError::invalid(format!(
            "temperature must be in ({TEMPERATURE_MIN}, {TEMPERATURE_MAX}], got {temperature}"
        )))
    }
}

pub fn validate_target_rate(rate: f64) -> Result<f64> {
    if rate > TARGET_RATE_MIN && rate <= TARGET_RATE_MAX {
        Ok(rate)
    } else {
        Err(PlateError::invalid(format!(
            "target_rate must be in ({TARGET_RATE_MIN}, {TARGET_RATE_MAX}], got {rate}"
        )))
    }
}

/// Inputs of one board generation, already range-checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardParams {
    geometry: Geometry,
    powder: PowderCategory,
    annealed: bool,
    temperature: f64,
    /// `None` selects the area-tiered default.
    target_rate: Option<f64>,
    min_failures: usize,
}

impl BoardParams {
    pub fn new(
        geometry: Geometry,
        powder: PowderCategory,
        annealed: bool,
        temperature: f64,
        target_rate: Option<f64>,
        min_failures: usize,
    ) -> Result<Self> {
        validate_temperature(temperature)?;
        if let Some(rate) = target_rate {
            validate_target_rate(rate)?;
        }
        Ok(Self { geometry, powder, annealed, temperature, target_rate, min_failures })
    }

    pub fn from_defaults(
        geometry: Geometry,
        powder: PowderCategory,
        annealed: bool,
        defaults: &RequestDefaults,
    ) -> Result<Self> {
        Self::new(geometry, powder, annealed, defaults.temperature, None, defaults.min_failures)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Result<Self> {
        self.temperature = validate_temperature(temperature)?;
        Ok(self)
    }

    pub fn with_target_rate(mut self, rate: f64) -> Result<Self> {
        self.target_rate = Some(validate_target_rate(rate)?);
        Ok(self)
    }

    pub fn with_min_failures(mut self, min_failures: usize) -> Self {
        self.min_failures = min_failures;
        self
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn powder(&self) -> PowderCategory {
        self.powder
    }

    pub fn annealed(&self) -> bool {
        self.annealed
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn target_rate(&self) -> Option<f64> {
        self.target_rate
    }

    pub fn min_failures(&self) -> usize {
        self.min_failures
    }

    /// Requested rate, or the configured default for this plate size.
    pub fn resolved_target_rate(&self, defaults: &RequestDefaults) -> f64 {
        self.target_rate.unwrap_or_else(|| defaults.target_rate_for_area(self.geometry.area()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> Geometry {
        Geometry::square(7).unwrap()
    }

    #[test]
    fn test_temperature_bounds() {
        assert!(validate_temperature(0.1).is_err());
        assert!(validate_temperature(0.11).is_ok());
        assert!(validate_temperature(10.0).is_ok());
        assert!(validate_temperature(10.01).is_err());
        assert!(validate_temperature(f64::NAN).is_err());
    }

    #[test]
    fn test_target_rate_bounds() {
        assert!(validate_target_rate(0.05).is_err());
        assert!(validate_target_rate(0.33).is_ok());
        assert!(validate_target_rate(0.75).is_ok());
        assert!(validate_target_rate(0.8).is_err());
        assert!(validate_target_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_new_validates() {
        let ok = BoardParams::new(geometry(), PowderCategory::Virgin, false, 1.8, Some(0.33), 1);
        assert!(ok.is_ok());
        let bad = BoardParams::new(geometry(), PowderCategory::Virgin, false, -1.0, None, 1);
        assert_eq!(bad.unwrap_err().code(), "invalid_parameter");
        let bad = BoardParams::new(geometry(), PowderCategory::Virgin, false, 1.0, Some(0.9), 1);
        assert!(bad.is_err());
    }

    #[test]
    fn test_defaults_and_resolution() {
        let defaults = RequestDefaults::default();
        let params =
            BoardParams::from_defaults(geometry(), PowderCategory::Recycled, true, &defaults)
                .unwrap();
        assert!((params.temperature() - 1.8).abs() < 1e-12);
        assert_eq!(params.min_failures(), 1);
        assert!((params.resolved_target_rate(&defaults) - 0.30).abs() < 1e-12);

        let params = params.with_target_rate(0.4).unwrap().with_min_failures(3);
        assert!((params.resolved_target_rate(&defaults) - 0.4).abs() < 1e-12);
        assert_eq!(params.min_failures(), 3);
        assert!(params.clone().with_temperature(20.0).is_err());
    }
}
