//! Errors produced by text-generation backends

use thiserror::Error;

/// Errors that can occur while calling the text-generation collaborator
///
/// The collaborator is treated as an opaque, possibly slow, possibly failing
/// remote oracle; every variant here is a transport or generation failure,
/// never a business-rule violation.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// API request failed with the given message
    #[error("API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Request timed out after the specified duration (in seconds)
    #[error("request timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    /// Response arrived but carried no usable text
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Missing API keys or invalid backend settings
    #[error("configuration error: {message}")]
    ConfigurationError { message: String },

    /// Network-level failure before a response was received
    #[error("network error: {message}")]
    NetworkError { message: String },

    /// Generic error for other cases
    #[error("{message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GenerationError::ApiError {
            message: "boom".to_string(),
            status_code: Some(500),
        };
        assert_eq!(err.to_string(), "API error: boom");

        let err = GenerationError::TimeoutError { seconds: 30 };
        assert!(err.to_string().contains("30 seconds"));
    }
}
