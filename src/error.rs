//! Error types for the house price service

use thiserror::Error;

/// Result type alias for house price operations
pub type Result<T> = std::result::Result<T, HousePriceError>;

/// Main error type for training and serving
#[derive(Error, Debug)]
pub enum HousePriceError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Optimization error: {0}")]
    OptimizationError(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    #[error("Artifact error: {path}: {reason}")]
    ArtifactError { path: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl HousePriceError {
    /// Artifact failure tied to a path on disk
    pub fn artifact(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        HousePriceError::ArtifactError {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Out-of-range configuration or search parameter
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        HousePriceError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for HousePriceError {
    fn from(err: polars::error::PolarsError) -> Self {
        HousePriceError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for HousePriceError {
    fn from(err: serde_json::Error) -> Self {
        HousePriceError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HousePriceError {
    fn from(err: ndarray::ShapeError) -> Self {
        HousePriceError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HousePriceError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HousePriceError = io_err.into();
        assert!(matches!(err, HousePriceError::IoError(_)));
    }

    #[test]
    fn test_artifact_error_names_path() {
        let err = HousePriceError::artifact("models/20250805/scaler.json", "missing");
        assert_eq!(
            err.to_string(),
            "Artifact error: models/20250805/scaler.json: missing"
        );
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = HousePriceError::invalid_parameter("test_size", 1.5, "must be in (0, 1)");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: test_size = 1.5, must be in (0, 1)"
        );
    }
}
