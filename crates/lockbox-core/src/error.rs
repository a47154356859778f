//! Error types module
//!
//! This module provides the core error type used throughout Lockbox. All
//! errors are unified under the `AppError` enum which can represent
//! validation, storage, processing and infrastructure failures.
//!
//! Encryption failures (bad key length, truncated ciphertext, authentication
//! failure) surface as `Internal` but carry messages that distinguish them
//! from plain I/O failure: an authentication failure must never be retried
//! with the same key, while an I/O failure may be.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code (e.g. "NOT_FOUND") for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Processing(_) => "PROCESSING_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// Decryption failures from the encryption layer are reported as
    /// `Internal` but are not recoverable; they are excluded here by message
    /// so callers never retry a wrong key or a truncated ciphertext.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Storage(_) => true,
            AppError::Internal(msg) => {
                !msg.contains("authentication") && !msg.contains("too short")
            }
            _ => false,
        }
    }
}

// Error conversion implementations following Rust best practices
impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            AppError::InvalidInput("x".to_string()).error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_auth_failure_not_recoverable() {
        let io_failure = AppError::Internal("IO error: disk".to_string());
        assert!(io_failure.is_recoverable());

        let auth_failure = AppError::Internal("decryption failed (authentication)".to_string());
        assert!(!auth_failure.is_recoverable());

        // Truncated ciphertext never decrypts on retry either.
        let truncated = AppError::Internal("ciphertext too short".to_string());
        assert!(!truncated.is_recoverable());
    }
}
