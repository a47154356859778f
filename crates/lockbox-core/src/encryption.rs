//! Streaming encryption service for attachments at rest
//!
//! Uses AES-256-GCM for authenticated encryption. Every encrypt call draws a
//! fresh random nonce and prepends it to the ciphertext; decrypt splits the
//! nonce off the front before opening. Decrypting tampered data, or data
//! encrypted under a different key, fails with an authentication error
//! rather than returning garbage.
//!
//! The reference behavior buffers the full payload in memory per call. The
//! external contract is stream in, stream out, so a chunked AEAD
//! construction can replace the internals without touching callers.

use crate::keystore::KeyStore;
use crate::AppError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use async_trait::async_trait;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

/// AES-256-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// Required key length in bytes (256-bit key).
pub const KEY_LENGTH: usize = 32;

/// Minimum number of distinct byte values a key must exhibit. A coarse
/// strength heuristic, not entropy estimation.
const MIN_DISTINCT_KEY_BYTES: usize = 8;

/// Boxed async byte source used throughout the pipeline.
pub type ByteReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Authenticated encryption over byte streams under a caller-supplied key.
#[async_trait]
pub trait Encryption: Send + Sync {
    /// Encrypt a byte stream. The returned stream yields nonce-prefixed
    /// ciphertext.
    async fn encrypt_stream(&self, src: ByteReader, key: &str) -> Result<ByteReader, AppError>;

    /// Decrypt a nonce-prefixed ciphertext stream produced by
    /// `encrypt_stream`.
    async fn decrypt_stream(&self, src: ByteReader, key: &str) -> Result<ByteReader, AppError>;
}

/// Check whether a caller-supplied key is acceptable at the request boundary.
///
/// A key passes only if it is exactly 32 bytes, is not a single repeated
/// byte, and exhibits a minimum number of distinct byte values. This gate is
/// enforced before storage is touched, not inside the encryption service.
pub fn is_valid_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    if bytes.len() != KEY_LENGTH {
        return false;
    }

    let mut seen = [false; 256];
    let mut distinct = 0;
    for &b in bytes {
        if !seen[b as usize] {
            seen[b as usize] = true;
            distinct += 1;
        }
    }

    distinct >= MIN_DISTINCT_KEY_BYTES
}

/// AES-256-GCM implementation of [`Encryption`].
///
/// The key store is injected at construction (process lifetime, no ambient
/// singleton); per-call operations take the raw key from the caller.
#[derive(Clone)]
pub struct AesGcmEncryption {
    keystore: Arc<dyn KeyStore>,
}

impl AesGcmEncryption {
    pub fn new(keystore: Arc<dyn KeyStore>) -> Self {
        Self { keystore }
    }

    /// The secret store this service was constructed with.
    pub fn key_store(&self) -> &Arc<dyn KeyStore> {
        &self.keystore
    }

    fn cipher_for(key: &str) -> Result<Aes256Gcm, AppError> {
        let key_bytes = key.as_bytes();
        if key_bytes.len() != KEY_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "encryption key must be {} bytes, got {}",
                KEY_LENGTH,
                key_bytes.len()
            )));
        }
        Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key_bytes)))
    }

    fn encrypt(&self, data: &[u8], key: &str) -> Result<Vec<u8>, AppError> {
        let cipher = Self::cipher_for(key)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, data)
            .map_err(|e| AppError::Internal(format!("encryption failed: {}", e)))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    fn decrypt(&self, data: &[u8], key: &str) -> Result<Vec<u8>, AppError> {
        let cipher = Self::cipher_for(key)?;

        if data.len() < NONCE_SIZE {
            return Err(AppError::Internal("ciphertext too short".to_string()));
        }

        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        cipher
            .decrypt(nonce, &data[NONCE_SIZE..])
            .map_err(|e| AppError::Internal(format!("decryption failed (authentication): {}", e)))
    }
}

#[async_trait]
impl Encryption for AesGcmEncryption {
    async fn encrypt_stream(&self, mut src: ByteReader, key: &str) -> Result<ByteReader, AppError> {
        let mut plaintext = Vec::new();
        src.read_to_end(&mut plaintext).await?;

        let ciphertext = self.encrypt(&plaintext, key)?;
        Ok(Box::pin(Cursor::new(ciphertext)))
    }

    async fn decrypt_stream(&self, mut src: ByteReader, key: &str) -> Result<ByteReader, AppError> {
        let mut ciphertext = Vec::new();
        src.read_to_end(&mut ciphertext).await?;

        let plaintext = self.decrypt(&ciphertext, key)?;
        Ok(Box::pin(Cursor::new(plaintext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::InMemoryKeyStore;

    const KEY: &str = "12345678901234567890123456789012";
    const OTHER_KEY: &str = "abcdefghijklmnopqrstuvwxyz012345";

    fn test_service() -> AesGcmEncryption {
        AesGcmEncryption::new(Arc::new(InMemoryKeyStore::new()))
    }

    async fn read_all(mut reader: ByteReader) -> Vec<u8> {
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        out
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("12345678901234567890123456789012"));
        assert!(!is_valid_key("00000000000000000000000000000000"));
        assert!(!is_valid_key("11111111111111111111111111111111"));
        assert!(!is_valid_key("short"));
        assert!(!is_valid_key("123456789012345678901234567890123"));
        // 32 bytes, but only four distinct values
        assert!(!is_valid_key("abcdabcdabcdabcdabcdabcdabcdabcd"));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let service = test_service();
        let payload = b"some attachment bytes".to_vec();

        let encrypted = service
            .encrypt_stream(Box::pin(Cursor::new(payload.clone())), KEY)
            .await
            .unwrap();
        let ciphertext = read_all(encrypted).await;
        assert_ne!(ciphertext, payload);

        let decrypted = service
            .decrypt_stream(Box::pin(Cursor::new(ciphertext)), KEY)
            .await
            .unwrap();
        assert_eq!(read_all(decrypted).await, payload);
    }

    #[tokio::test]
    async fn test_wrong_key_fails_authentication() {
        let service = test_service();
        let encrypted = service
            .encrypt_stream(Box::pin(Cursor::new(b"secret".to_vec())), KEY)
            .await
            .unwrap();
        let ciphertext = read_all(encrypted).await;

        let result = service
            .decrypt_stream(Box::pin(Cursor::new(ciphertext)), OTHER_KEY)
            .await;
        match result {
            Err(AppError::Internal(msg)) => assert!(msg.contains("authentication")),
            other => panic!("expected authentication error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_tampered_ciphertext_fails() {
        let service = test_service();
        let encrypted = service
            .encrypt_stream(Box::pin(Cursor::new(b"secret".to_vec())), KEY)
            .await
            .unwrap();
        let mut ciphertext = read_all(encrypted).await;
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;

        let result = service
            .decrypt_stream(Box::pin(Cursor::new(ciphertext)), KEY)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ciphertext_too_short() {
        let service = test_service();
        let result = service
            .decrypt_stream(Box::pin(Cursor::new(vec![0u8; 5])), KEY)
            .await;
        match result {
            Err(AppError::Internal(msg)) => assert!(msg.contains("too short")),
            other => panic!("expected too-short error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_invalid_key_length_rejected() {
        let service = test_service();
        let result = service
            .encrypt_stream(Box::pin(Cursor::new(b"data".to_vec())), "short-key")
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
