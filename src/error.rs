// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the NPK inference library.

use std::fmt;

/// Result type alias for prediction operations.
pub type Result<T> = std::result::Result<T, PredictError>;

/// Main error type for the NPK inference library.
#[derive(Debug)]
pub enum PredictError {
    /// Wrong number of positional measurements.
    ArgumentCount {
        /// Number of values required.
        expected: usize,
        /// Number of values given.
        got: usize,
    },
    /// A measurement could not be parsed as a number.
    ArgumentType(String),
    /// Command line rejected by the argument parser.
    InvalidCli(String),
    /// Error loading the ONNX model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error parsing model metadata.
    MetadataError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl PredictError {
    /// Whether this error comes from the shape or type of the measurements,
    /// as opposed to loading or running the model.
    #[must_use]
    pub const fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount { .. } | Self::ArgumentType(_) | Self::InvalidCli(_)
        )
    }

    /// Message carried in the `{"error": ...}` payload on stdout.
    #[must_use]
    pub fn payload_message(&self) -> String {
        match self {
            Self::ArgumentCount { .. } => "Invalid number of arguments".to_string(),
            Self::ArgumentType(_) => "Invalid argument types".to_string(),
            Self::InvalidCli(msg) => format!("Invalid arguments: {msg}"),
            _ => format!("Model error: {self}"),
        }
    }
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentCount { expected, got } => {
                write!(f, "Expected {expected} measurements, got {got}")
            }
            Self::ArgumentType(value) => write!(f, "Not a number: '{value}'"),
            Self::InvalidCli(msg) => write!(f, "Invalid arguments: {msg}"),
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::MetadataError(msg) => write!(f, "Metadata error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for PredictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PredictError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PredictError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = PredictError::InferenceError("test".to_string());
        assert_eq!(err.to_string(), "Inference error: test");

        let err = PredictError::ArgumentCount {
            expected: 4,
            got: 2,
        };
        assert_eq!(err.to_string(), "Expected 4 measurements, got 2");
    }

    #[test]
    fn test_payload_messages() {
        let err = PredictError::ArgumentCount {
            expected: 4,
            got: 0,
        };
        assert_eq!(err.payload_message(), "Invalid number of arguments");

        let err = PredictError::ArgumentType("abc".to_string());
        assert_eq!(err.payload_message(), "Invalid argument types");

        let err = PredictError::ModelLoadError("Model file not found: x.onnx".to_string());
        assert_eq!(
            err.payload_message(),
            "Model error: Model load error: Model file not found: x.onnx"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert!(PredictError::ArgumentType("x".to_string()).is_argument_error());
        assert!(PredictError::InvalidCli("x".to_string()).is_argument_error());
        assert!(!PredictError::InferenceError("x".to_string()).is_argument_error());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!PredictError::from(io).is_argument_error());
    }
}
