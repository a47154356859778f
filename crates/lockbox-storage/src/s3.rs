use crate::local::LocalVault;
use crate::naming;
use crate::traits::{AttachmentStore, DownloadStream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use lockbox_core::{AppError, Attachment, Encryption, RawUpload, S3Config};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

/// S3-compatible object-store backend.
///
/// Reuses a [`LocalVault`] purely as its staging mechanism (`initialise` and
/// `hold` run against the local staging prefix); durable copies are written
/// to the bucket under `prefix/{uid}[.preview].enc` — the same deterministic
/// naming the local backend uses, just rooted under a key prefix instead of
/// a directory.
#[derive(Clone)]
pub struct S3Vault {
    store: AmazonS3,
    bucket: String,
    prefix: String,
    staging: LocalVault,
    encryption: Arc<dyn Encryption>,
}

impl S3Vault {
    /// Build an S3 backend from object-store options.
    ///
    /// Credentials fall back to the ambient AWS environment when no static
    /// pair is configured. A custom endpoint enables S3-compatible providers
    /// (MinIO, Spaces); plain-http endpoints are allowed for those.
    pub fn new(
        options: &S3Config,
        staging: LocalVault,
        encryption: Arc<dyn Encryption>,
    ) -> Result<Self, AppError> {
        if options.bucket.is_empty() {
            return Err(AppError::InvalidInput(
                "S3 bucket is not configured".to_string(),
            ));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_region(options.region.clone())
            .with_bucket_name(options.bucket.clone());

        if let Some(ref endpoint) = options.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        if let (Some(access_key_id), Some(secret)) =
            (&options.access_key_id, &options.secret_access_key)
        {
            builder = builder
                .with_access_key_id(access_key_id.clone())
                .with_secret_access_key(secret.clone());
        }

        if options.force_path_style {
            builder = builder.with_virtual_hosted_style_request(false);
        }

        let store = builder
            .build()
            .map_err(|e| AppError::Storage(format!("failed to build S3 client: {}", e)))?;

        Ok(S3Vault {
            store,
            bucket: options.bucket.clone(),
            prefix: options.prefix.clone(),
            staging,
            encryption,
        })
    }

    /// Encrypt one staged file and put it under its deterministic object
    /// key. The ciphertext is buffered in memory so the transport can seek
    /// and retry.
    async fn persist_object(
        &self,
        uid: Uuid,
        file_path: &Path,
        preview: bool,
        key: &str,
    ) -> Result<(), AppError> {
        let source = fs::File::open(file_path).await.map_err(|e| {
            AppError::Internal(format!("failed to open {}: {}", file_path.display(), e))
        })?;

        let mut encrypted = self.encryption.encrypt_stream(Box::pin(source), key).await?;

        let mut ciphertext = Vec::new();
        encrypted.read_to_end(&mut ciphertext).await?;
        let size_bytes = ciphertext.len() as u64;

        let object_key = naming::object_key(&self.prefix, uid, preview);
        let location = ObjectPath::from(object_key.clone());

        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(Bytes::from(ciphertext)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %object_key,
                size_bytes = size_bytes,
                "S3 upload failed"
            );
            AppError::Storage(format!("S3 upload failed: {}", e))
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %object_key,
            size_bytes = size_bytes,
            "encrypted attachment object stored"
        );

        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for S3Vault {
    async fn initialise(&self) -> Result<(), AppError> {
        self.staging.initialise().await
    }

    async fn hold(&self, upload: RawUpload) -> Result<Attachment, AppError> {
        self.staging.hold(upload).await
    }

    async fn upload(&self, attachment: &Attachment, key: &str) -> Result<(), AppError> {
        // Before any network or filesystem access.
        if attachment.local_path.is_none() {
            return Err(AppError::InvalidInput(
                "attachment has no staged local file".to_string(),
            ));
        }

        for (file_path, preview) in attachment.local_files() {
            self.persist_object(attachment.uid, file_path, preview, key)
                .await?;
        }

        Ok(())
    }

    async fn download(
        &self,
        attachment: &Attachment,
        preview: bool,
        key: &str,
    ) -> Result<DownloadStream, AppError> {
        let object_key = naming::object_key(&self.prefix, attachment.uid, preview);
        let location = ObjectPath::from(object_key.clone());

        let result: ObjectResult<_> = self.store.get(&location).await;
        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => {
                AppError::NotFound(format!("encrypted object {} not found", object_key))
            }
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %object_key,
                    "S3 download failed"
                );
                AppError::Storage(format!("S3 download failed: {}", other))
            }
        })?;

        // Consume the transport response fully before decrypting, so the
        // returned stream owns no network resources.
        let ciphertext = result
            .bytes()
            .await
            .map_err(|e| AppError::Storage(format!("S3 download failed: {}", e)))?;

        let decrypted = self
            .encryption
            .decrypt_stream(Box::pin(Cursor::new(ciphertext)), key)
            .await?;

        let stream =
            tokio_util::io::ReaderStream::new(decrypted).map(|result| result.map_err(Into::into));

        Ok(Box::pin(stream))
    }

    async fn delete(&self, attachment_uid: Uuid) -> Result<(), AppError> {
        let main_key = naming::object_key(&self.prefix, attachment_uid, false);
        let result: ObjectResult<_> = self.store.delete(&ObjectPath::from(main_key.clone())).await;
        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "S3 delete of {} failed: {}",
                    main_key, e
                )));
            }
        }

        // Best effort: a missing preview object is not an error.
        let preview_key = naming::object_key(&self.prefix, attachment_uid, true);
        if let Err(e) = self.store.delete(&ObjectPath::from(preview_key.clone())).await {
            tracing::debug!(key = %preview_key, error = %e, "preview object delete skipped");
        }

        tracing::info!(bucket = %self.bucket, uid = %attachment_uid, "durable objects deleted");
        Ok(())
    }
}
