//! Secret store contract
//!
//! Maps an identifier to raw secret bytes. Consumed by the encryption
//! service's constructor; per-call operations take the key from the caller.

use crate::AppError;
use std::collections::HashMap;
use std::sync::RwLock;

pub trait KeyStore: Send + Sync {
    /// Store a key under the given identifier.
    fn store_key(&self, id: &str, key: &[u8]) -> Result<(), AppError>;

    /// Retrieve a key by its identifier.
    fn retrieve_key(&self, id: &str) -> Result<Vec<u8>, AppError>;

    /// Delete a key by its identifier.
    fn delete_key(&self, id: &str) -> Result<(), AppError>;
}

/// In-memory key store, suitable for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryKeyStore {
    storage: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for InMemoryKeyStore {
    fn store_key(&self, id: &str, key: &[u8]) -> Result<(), AppError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| AppError::Internal("key store lock poisoned".to_string()))?;
        storage.insert(id.to_string(), key.to_vec());
        Ok(())
    }

    fn retrieve_key(&self, id: &str) -> Result<Vec<u8>, AppError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| AppError::Internal("key store lock poisoned".to_string()))?;
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("key not found: {}", id)))
    }

    fn delete_key(&self, id: &str) -> Result<(), AppError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| AppError::Internal("key store lock poisoned".to_string()))?;
        storage.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_retrieve_delete() {
        let store = InMemoryKeyStore::new();

        store.store_key("primary", b"secret-bytes").unwrap();
        assert_eq!(store.retrieve_key("primary").unwrap(), b"secret-bytes");

        store.delete_key("primary").unwrap();
        assert!(matches!(
            store.retrieve_key("primary"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let store = InMemoryKeyStore::new();
        assert!(store.delete_key("never-stored").is_ok());
    }
}
