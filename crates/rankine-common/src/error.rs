//! Error types for Rankine.

use thiserror::Error;

/// Result type alias using RankineError.
pub type Result<T> = std::result::Result<T, RankineError>;

/// Errors that can occur in Rankine operations.
#[derive(Debug, Error)]
pub enum RankineError {
    // I/O errors (dataset ingestion)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Dataset errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    // Report serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: RankineError = io_err.into();
        assert!(matches!(err, RankineError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = RankineError::InvalidConfig("stage_sizes must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: stage_sizes must not be empty"
        );
    }

    #[test]
    fn test_dataset_error_display() {
        let err = RankineError::Dataset("no parseable rows".to_string());
        assert_eq!(err.to_string(), "Dataset error: no parseable rows");
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(RankineError::Dataset("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RankineError>();
    }
}
