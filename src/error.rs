//! Error types for course-qa
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in course-qa
#[derive(Debug, Error)]
pub enum CourseQaError {
    /// Invalid setup, e.g. a tool published without a name
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retrieval backend error
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for course-qa operations
pub type Result<T> = std::result::Result<T, CourseQaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CourseQaError::Config("Tool must have a 'name' in its definition".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Tool must have a 'name' in its definition"
        );
    }

    #[test]
    fn test_llm_error() {
        let err = CourseQaError::Llm("rate limited".to_string());
        assert_eq!(err.to_string(), "LLM error: rate limited");
    }

    #[test]
    fn test_store_error() {
        let err = CourseQaError::Store("catalog unavailable".to_string());
        assert_eq!(err.to_string(), "Store error: catalog unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CourseQaError = io_err.into();
        assert!(matches!(err, CourseQaError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: CourseQaError = json_err.into();
        assert!(matches!(err, CourseQaError::Json(_)));
    }
}
