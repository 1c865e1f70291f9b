//! JSON API for board generation
//!
//! String-in/string-out entry point for a thin HTTP or game-engine layer.
//! Every call answers with an [`ApiResponse`] envelope, success or not.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::board::{BoardGenerator, BoardParams, BoardResult, SpatialTransform};
use crate::config::RequestDefaults;
use crate::error::{PlateError, Result};
use crate::geometry::{annealing_from_flag, Geometry, PowderCategory};
use crate::model::ProbabilitySource;

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// Caller mistake rather than a server-side failure
    pub client_error: bool,
}

impl From<&PlateError> for ApiError {
    fn from(err: &PlateError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            client_error: err.is_client_error(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Board request as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRequest {
    pub rows: usize,
    pub cols: usize,
    /// "Virgin" or "Recycled"
    pub powder: String,
    /// Thermal annealing, 0 or 1
    pub ta: u8,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub target_rate: Option<f64>,
    #[serde(default)]
    pub min_failures: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BoardRequest {
    pub fn to_params(&self, defaults: &RequestDefaults) -> Result<BoardParams> {
        let geometry = Geometry::new(self.rows, self.cols)?;
        let powder: PowderCategory = self.powder.parse()?;
        let annealed = annealing_from_flag(self.ta)?;
        BoardParams::new(
            geometry,
            powder,
            annealed,
            self.temperature.unwrap_or(defaults.temperature),
            self.target_rate,
            self.min_failures.unwrap_or(defaults.min_failures),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardResponse {
    pub rows: usize,
    pub cols: usize,
    pub powder: String,
    pub ta: u8,
    /// 1 = scrap
    pub board: Vec<Vec<u8>>,
    /// 1 = core cell
    pub core: Vec<Vec<u8>>,
    pub forced: bool,
    pub mean_prob: f64,
    /// Effective non-core target rate
    pub target_rate: Option<f64>,
    pub transform: SpatialTransform,
    pub required_failures: usize,
    pub generated_with_seed: u64,
}

impl BoardResponse {
    pub fn from_result(result: &BoardResult, seed: u64) -> Self {
        Self {
            rows: result.geometry.rows(),
            cols: result.geometry.cols(),
            powder: result.powder.as_str().to_string(),
            ta: u8::from(result.annealed),
            board: result.board.to_rows(),
            core: result.core.to_binary_rows(),
            forced: result.forced,
            mean_prob: result.mean_prob,
            target_rate: result.target_nc,
            transform: result.transform,
            required_failures: result.required_failures,
            generated_with_seed: seed,
        }
    }
}

/// Validate, seed and generate. Unseeded requests draw a fresh seed and report it.
pub fn generate_board<S: ProbabilitySource>(
    generator: &BoardGenerator<S>,
    request: &BoardRequest,
) -> Result<BoardResponse> {
    let params = request.to_params(&generator.config().defaults)?;
    let seed = request.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let result = generator.generate(&params, &mut rng)?;
    Ok(BoardResponse::from_result(&result, seed))
}

/// Generate a board from a JSON request string.
///
/// # Returns
/// JSON string containing `ApiResponse<BoardResponse>`
pub fn generate_board_json<S: ProbabilitySource>(
    generator: &BoardGenerator<S>,
    request_json: &str,
) -> String {
    let response = match serde_json::from_str::<BoardRequest>(request_json) {
        Err(e) => {
            warn!("Failed to parse BoardRequest: {}", e);
            ApiResponse::<BoardResponse>::error(ApiError::from(&PlateError::from(e)))
        }
        Ok(request) => match generate_board(generator, &request) {
            Ok(board) => {
                info!(
                    rows = board.rows,
                    cols = board.cols,
                    seed = board.generated_with_seed,
                    "board generated"
                );
                ApiResponse::success(board)
            }
            Err(err) if err.is_client_error() => {
                warn!("Board request rejected: {}", err);
                ApiResponse::error(ApiError::from(&err))
            }
            Err(err) => {
                error!("Board generation failed: {}", err);
                ApiResponse::error(ApiError::from(&err))
            }
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::model::{LazyModelSource, UniformSource};
    use serde_json::json;

    fn generator() -> BoardGenerator<UniformSource> {
        BoardGenerator::new(UniformSource(0.2), GeneratorConfig::default())
    }

    fn parse(json: &str) -> ApiResponse<BoardResponse> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_basic_generation() {
        let request = json!({
            "rows": 7, "cols": 7, "powder": "Virgin", "ta": 0,
            "temperature": 1.8, "target_rate": 0.33, "min_failures": 1, "seed": 42
        });
        let response = parse(&generate_board_json(&generator(), &request.to_string()));

        assert!(response.success);
        assert_eq!(response.schema_version, API_VERSION);
        let data = response.data.unwrap();
        assert_eq!((data.rows, data.cols), (7, 7));
        assert_eq!(data.board.len(), 7);
        assert!(data.board.iter().all(|row| row.len() == 7));
        assert_eq!(data.core.iter().flatten().filter(|&&c| c == 1).count(), 9);
        assert_eq!(data.generated_with_seed, 42);
        assert_eq!(data.required_failures, 12);
    }

    #[test]
    fn test_seeded_requests_are_reproducible() {
        let request = json!({ "rows": 9, "cols": 9, "powder": "Recycled", "ta": 1, "seed": 777 }).to_string();
        let a = parse(&generate_board_json(&generator(), &request)).data.unwrap();
        let b = parse(&generate_board_json(&generator(), &request)).data.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unseeded_request_reports_seed() {
        let request = BoardRequest {
            rows: 5,
            cols: 5,
            powder: "Virgin".into(),
            ta: 0,
            temperature: None,
            target_rate: None,
            min_failures: None,
            seed: None,
        };
        let first = generate_board(&generator(), &request).unwrap();
        let replay = BoardRequest { seed: Some(first.generated_with_seed), ..request };
        assert_eq!(generate_board(&generator(), &replay).unwrap(), first);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let cases = [
            json!({ "rows": 2, "cols": 7, "powder": "Virgin", "ta": 0 }),
            json!({ "rows": 7, "cols": 12, "powder": "Virgin", "ta": 0 }),
            json!({ "rows": 7, "cols": 7, "powder": "Mixed", "ta": 0 }),
            json!({ "rows": 7, "cols": 7, "powder": "Virgin", "ta": 2 }),
            json!({ "rows": 7, "cols": 7, "powder": "Virgin", "ta": 0, "temperature": 0.05 }),
            json!({ "rows": 7, "cols": 7, "powder": "Virgin", "ta": 0, "target_rate": 0.9 }),
        ];
        for case in cases {
            let response = parse(&generate_board_json(&generator(), &case.to_string()));
            assert!(!response.success, "{case}");
            assert!(response.data.is_none());
            let error = response.error.unwrap();
            assert_eq!(error.code, "invalid_parameter");
            assert!(error.client_error);
        }
    }

    #[test]
    fn test_malformed_json() {
        let response = parse(&generate_board_json(&generator(), "{ rows: 7"));
        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, "serialization_error");
    }

    #[test]
    fn test_missing_model_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator = BoardGenerator::new(
            LazyModelSource::new(dir.path().join("missing.json")),
            GeneratorConfig::default(),
        );
        let request = json!({ "rows": 5, "cols": 5, "powder": "Virgin", "ta": 0, "seed": 1 });
        let response = parse(&generate_board_json(&generator, &request.to_string()));
        let error = response.error.unwrap();
        assert_eq!(error.code, "model_unavailable");
        assert!(!error.client_error);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let request: BoardRequest =
            serde_json::from_str(r#"{"rows":6,"cols":6,"powder":"Virgin","ta":1}"#).unwrap();
        let params = request.to_params(&RequestDefaults::default()).unwrap();
        assert!((params.temperature() - 1.8).abs() < 1e-12);
        assert_eq!(params.min_failures(), 1);
        assert_eq!(params.target_rate(), None);
        assert!(params.annealed());
    }
}
