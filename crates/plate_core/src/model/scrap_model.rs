//! Scrap classifier
//!
//! Logistic model over the per-cell position features, the powder category
//! and the annealing flag.
//!
//! Artifact schema:
//! ```json
//! {
//!   "type": "scrap_logit_v1",
//!   "intercept": -1.6,
//!   "coefficients": { "r": 0.15, "c": -0.1, "dist_edge_min": -3.2, "dist_center": 1.4, "ta": -0.45 },
//!   "powder_offsets": { "Virgin": 0.0, "Recycled": 0.55 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::features::{feature_grid, CellFeatures};
use super::source::ProbabilitySource;
use crate::board::calibrator::sigmoid;
use crate::error::{PlateError, Result};
use crate::geometry::{Geometry, PowderCategory};
use crate::grid::ProbabilityMatrix;

pub const MODEL_TYPE: &str = "scrap_logit_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeights {
    pub r: f64,
    pub c: f64,
    pub dist_edge_min: f64,
    pub dist_center: f64,
    pub ta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowderOffsets {
    #[serde(rename = "Virgin")]
    pub virgin: f64,
    #[serde(rename = "Recycled")]
    pub recycled: f64,
}

impl PowderOffsets {
    pub fn get(&self, powder: PowderCategory) -> f64 {
        match powder {
            PowderCategory::Virgin => self.virgin,
            PowderCategory::Recycled => self.recycled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub intercept: f64,
    pub coefficients: FeatureWeights,
    pub powder_offsets: PowderOffsets,
}

impl ScrapModel {
    /// Parse and check an artifact; the error is a human-readable reason.
    pub fn from_json(json: &str) -> std::result::Result<Self, String> {
        let model: ScrapModel =
            serde_json::from_str(json).map_err(|e| format!("invalid model JSON: {e}"))?;
        model.check()?;
        Ok(model)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |reason: String| PlateError::ModelUnavailable {
            path: path.display().to_string(),
            reason,
        };

        let raw = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        let model = Self::from_json(&raw).map_err(unavailable)?;
        info!(path = %path.display(), kind = %model.kind, "scrap model loaded");
        Ok(model)
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.kind != MODEL_TYPE {
            return Err(format!("unsupported model type {:?}, expected {MODEL_TYPE:?}", self.kind));
        }
        let w = &self.coefficients;
        let values = [
            self.intercept,
            w.r,
            w.c,
            w.dist_edge_min,
            w.dist_center,
            w.ta,
            self.powder_offsets.virgin,
            self.powder_offsets.recycled,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("model parameters must be finite".to_string());
        }
        Ok(())
    }

    pub fn log_odds(&self, f: &CellFeatures, powder: PowderCategory, annealed: bool) -> f64 {
        let w = &self.coefficients;
        self.intercept
            + w.r * f.r
            + w.c * f.c
            + w.dist_edge_min * f.dist_edge_min
            + w.dist_center * f.dist_center
            + w.ta * f64::from(u8::from(annealed))
            + self.powder_offsets.get(powder)
    }

    pub fn predict_map(
        &self,
        geometry: Geometry,
        powder: PowderCategory,
        annealed: bool,
    ) -> Result<ProbabilityMatrix> {
        let map = feature_grid(geometry).map(|f| sigmoid(self.log_odds(f, powder, annealed)));
        if let Some((i, j, p)) = map.indexed().find(|(_, _, p)| !p.is_finite()) {
            return Err(PlateError::InferenceError(format!(
                "non-finite probability {p} at ({i}, {j})"
            )));
        }
        Ok(map)
    }
}

impl ProbabilitySource for ScrapModel {
    fn predict(
        &self,
        geometry: Geometry,
        powder: PowderCategory,
        annealed: bool,
    ) -> Result<ProbabilityMatrix> {
        self.predict_map(geometry, powder, annealed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const SAMPLE_MODEL_JSON: &str = r#"{
        "type": "scrap_logit_v1",
        "intercept": -1.6,
        "coefficients": { "r": 0.15, "c": -0.1, "dist_edge_min": -3.2, "dist_center": 1.4, "ta": -0.45 },
        "powder_offsets": { "Virgin": 0.0, "Recycled": 0.55 }
    }"#;

    pub(crate) fn sample_model() -> ScrapModel {
        ScrapModel::from_json(SAMPLE_MODEL_JSON).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let model = sample_model();
        assert_eq!(model.kind, MODEL_TYPE);
        assert_eq!(model.powder_offsets.get(PowderCategory::Recycled), 0.55);
    }

    #[test]
    fn test_rejects_wrong_type() {
        let json = SAMPLE_MODEL_JSON.replace("scrap_logit_v1", "infer_mlp_v1");
        let err = ScrapModel::from_json(&json).unwrap_err();
        assert!(err.contains("unsupported model type"));
    }

    #[test]
    fn test_rejects_missing_field() {
        let err = ScrapModel::from_json(r#"{"type":"scrap_logit_v1","intercept":0.0}"#).unwrap_err();
        assert!(err.starts_with("invalid model JSON"));
    }

    #[test]
    fn test_prediction_shape_and_range() {
        let geometry = Geometry::new(5, 9).unwrap();
        let map = sample_model().predict(geometry, PowderCategory::Virgin, false).unwrap();
        assert_eq!(map.shape(), (5, 9));
        assert!(map.iter().all(|&p| p > 0.0 && p < 1.0));
    }

    #[test]
    fn test_edges_riskier_than_center() {
        let geometry = Geometry::square(7).unwrap();
        let map = sample_model().predict(geometry, PowderCategory::Virgin, false).unwrap();
        assert!(map[(0, 0)] > map[(3, 3)]);
        assert!(map[(3, 0)] > map[(3, 3)]);
    }

    #[test]
    fn test_categorical_signals_shift_risk() {
        let geometry = Geometry::square(5).unwrap();
        let model = sample_model();
        let virgin = model.predict(geometry, PowderCategory::Virgin, false).unwrap();
        let recycled = model.predict(geometry, PowderCategory::Recycled, false).unwrap();
        let annealed = model.predict(geometry, PowderCategory::Virgin, true).unwrap();
        assert!(recycled.mean() > virgin.mean());
        assert!(annealed.mean() < virgin.mean());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_MODEL_JSON.as_bytes()).unwrap();
        let model = ScrapModel::load(file.path()).unwrap();
        assert_eq!(model, sample_model());
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScrapModel::load(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "model_unavailable");
    }

    #[test]
    fn test_load_corrupt_file_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = ScrapModel::load(file.path()).unwrap_err();
        assert!(matches!(err, PlateError::ModelUnavailable { .. }));
    }
}
