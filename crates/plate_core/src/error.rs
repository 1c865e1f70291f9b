use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlateError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model unavailable at {path}: {reason}")]
    ModelUnavailable { path: String, reason: String },

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PlateError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PlateError::InvalidParameter(msg.into())
    }

    /// Stable machine-readable code for the boundary API.
    pub fn code(&self) -> &'static str {
        match self {
            PlateError::InvalidParameter(_) => "invalid_parameter",
            PlateError::ModelUnavailable { .. } => "model_unavailable",
            PlateError::InferenceError(_) => "inference_error",
            PlateError::Serialization(_) => "serialization_error",
        }
    }

    /// Caller mistakes, as opposed to failures of the probability source.
    pub fn is_client_error(&self) -> bool {
        match self {
            PlateError::InvalidParameter(_) => true,
            PlateError::Serialization(_) => true,
            PlateError::ModelUnavailable { .. } => false,
            PlateError::InferenceError(_) => false,
        }
    }
}

impl From<serde_json::Error> for PlateError {
    fn from(err: serde_json::Error) -> Self {
        PlateError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PlateError::invalid("rows").code(), "invalid_parameter");
        assert_eq!(
            PlateError::ModelUnavailable { path: "m.json".into(), reason: "missing".into() }.code(),
            "model_unavailable"
        );
        assert_eq!(PlateError::InferenceError("nan".into()).code(), "inference_error");
    }

    #[test]
    fn test_client_error_split() {
        assert!(PlateError::invalid("cols out of range").is_client_error());
        assert!(!PlateError::InferenceError("shape".into()).is_client_error());
        assert!(!PlateError::ModelUnavailable { path: "x".into(), reason: "y".into() }
            .is_client_error());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = PlateError::invalid("rows must be in 3..=11, got 2");
        assert_eq!(err.to_string(), "Invalid parameter: rows must be in 3..=11, got 2");
    }

    #[test]
    fn test_from_serde_json() {
        let err: PlateError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert_eq!(err.code(), "serialization_error");
    }
}
