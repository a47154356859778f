#[cfg(feature = "storage-local")]
use crate::LocalVault;
#[cfg(feature = "storage-s3")]
use crate::S3Vault;
use crate::{AttachmentStore, StorageBackend};
use lockbox_core::{AppError, Config, Encryption};
use std::sync::Arc;

/// Create a storage backend based on configuration. The choice is fixed for
/// the process lifetime.
pub fn create_store(
    config: &Config,
    encryption: Arc<dyn Encryption>,
) -> Result<Arc<dyn AttachmentStore>, AppError> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let vault = LocalVault::new(&config.staging_path, &config.durable_path, encryption);
            Ok(Arc::new(vault))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(AppError::InvalidInput(
            "local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(all(feature = "storage-s3", feature = "storage-local"))]
        StorageBackend::S3 => {
            // The S3 backend stages uploads through a local vault rooted at
            // the staging path.
            let staging =
                LocalVault::new(&config.staging_path, &config.staging_path, encryption.clone());
            let vault = S3Vault::new(&config.s3, staging, encryption)?;
            Ok(Arc::new(vault))
        }

        #[cfg(not(all(feature = "storage-s3", feature = "storage-local")))]
        StorageBackend::S3 => Err(AppError::InvalidInput(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),
    }
}
