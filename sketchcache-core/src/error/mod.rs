//! Core error types for sketchcache

pub mod cache;

use thiserror::Error;
pub use cache::{CacheError, CacheErrorKind, CacheResult};

/// Main error type for sketchcache operations
#[derive(Error, Debug)]
pub enum SketchCacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for sketchcache operations
pub type SketchCacheResult<T> = Result<T, SketchCacheError>;

impl From<serde_json::Error> for SketchCacheError {
    fn from(err: serde_json::Error) -> Self {
        SketchCacheError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for SketchCacheError {
    fn from(err: anyhow::Error) -> Self {
        SketchCacheError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndexDescriptor, Role};
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = SketchCacheError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let config_error = SketchCacheError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");

        let parse_error = SketchCacheError::Parse("invalid syntax".to_string());
        assert_eq!(format!("{}", parse_error), "Parsing error: invalid syntax");

        let input_error = SketchCacheError::InvalidInput("empty read set".to_string());
        assert_eq!(format!("{}", input_error), "Invalid input: empty read set");

        let other = SketchCacheError::Other("unknown".to_string());
        assert_eq!(format!("{}", other), "Other error: unknown");
    }

    #[test]
    fn test_cache_error_conversion() {
        let cache_err = CacheError::not_found(Role::Query, IndexDescriptor::new(0, 4));
        let err: SketchCacheError = cache_err.clone().into();

        match err {
            SketchCacheError::Cache(inner) => assert_eq!(inner, cache_err),
            _ => panic!("Expected Cache error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: SketchCacheError = io_err.into();

        match err {
            SketchCacheError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> = serde_json::from_str("{invalid json}");
        let err: SketchCacheError = parse_result.unwrap_err().into();

        match err {
            SketchCacheError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: SketchCacheError = anyhow::anyhow!("custom error message").into();
        match err {
            SketchCacheError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }
}
