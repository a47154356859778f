pub mod delete;
pub mod download;
pub mod upload;

use axum::http::HeaderMap;
use lockbox_core::{is_valid_key, AppError};

/// Header carrying the caller-supplied encryption key.
pub const ENCRYPTION_KEY_HEADER: &str = "x-encryption-key";

/// Extract and validate the encryption key from request headers. Missing or
/// weak keys are rejected before any storage work happens.
pub(crate) fn require_encryption_key(headers: &HeaderMap) -> Result<String, AppError> {
    let key = headers
        .get(ENCRYPTION_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if key.is_empty() {
        return Err(AppError::Unauthorized(format!(
            "missing {} header",
            ENCRYPTION_KEY_HEADER
        )));
    }
    if !is_valid_key(key) {
        return Err(AppError::Unauthorized(
            "encryption key is invalid".to_string(),
        ));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const KEY: &str = "12345678901234567890123456789012";

    #[test]
    fn test_valid_key_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(ENCRYPTION_KEY_HEADER, HeaderValue::from_static(KEY));
        assert_eq!(require_encryption_key(&headers).unwrap(), KEY);
    }

    #[test]
    fn test_missing_key_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            require_encryption_key(&headers),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_weak_key_rejected() {
        let mut headers = HeaderMap::new();
        // Correct length, not enough distinct bytes.
        headers.insert(
            ENCRYPTION_KEY_HEADER,
            HeaderValue::from_static("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
        );
        assert!(matches!(
            require_encryption_key(&headers),
            Err(AppError::Unauthorized(_))
        ));
    }
}
