use crate::naming;
use crate::traits::{AttachmentStore, DownloadStream};
use async_trait::async_trait;
use futures::StreamExt;
use lockbox_core::{AppError, Attachment, Encryption, RawUpload};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

/// Directory permission mode for staging and durable roots.
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

/// Local filesystem storage backend.
///
/// Raw uploads are staged under `staging_root/{uid}/{file_name}`; encrypted
/// durable copies live under `durable_root/{uid}/` using the shared naming
/// scheme. Also used by the S3 backend purely as its staging mechanism.
#[derive(Clone)]
pub struct LocalVault {
    staging_root: PathBuf,
    durable_root: PathBuf,
    encryption: Arc<dyn Encryption>,
}

impl LocalVault {
    pub fn new(
        staging_root: impl Into<PathBuf>,
        durable_root: impl Into<PathBuf>,
        encryption: Arc<dyn Encryption>,
    ) -> Self {
        Self {
            staging_root: staging_root.into(),
            durable_root: durable_root.into(),
            encryption,
        }
    }

    async fn ensure_directory(path: &Path) -> Result<(), AppError> {
        fs::create_dir_all(path).await.map_err(|e| {
            AppError::Internal(format!(
                "failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(DIRECTORY_MODE))
                .await
                .map_err(|e| {
                    AppError::Internal(format!(
                        "failed to set permissions on {}: {}",
                        path.display(),
                        e
                    ))
                })?;
        }

        Ok(())
    }

    /// Encrypt one staged file and write the ciphertext into the
    /// per-attachment durable directory under its deterministic name.
    async fn persist_file(
        &self,
        durable_dir: &Path,
        uid: Uuid,
        file_path: &Path,
        preview: bool,
        key: &str,
    ) -> Result<(), AppError> {
        let source = fs::File::open(file_path).await.map_err(|e| {
            AppError::Internal(format!("failed to open {}: {}", file_path.display(), e))
        })?;

        let mut encrypted = self.encryption.encrypt_stream(Box::pin(source), key).await?;

        let dest_path = durable_dir.join(naming::object_name(uid, preview));
        let mut dest = fs::File::create(&dest_path).await.map_err(|e| {
            AppError::Internal(format!("failed to create {}: {}", dest_path.display(), e))
        })?;

        let size_bytes = tokio::io::copy(&mut encrypted, &mut dest).await?;
        dest.sync_all().await?;

        tracing::info!(
            uid = %uid,
            preview = preview,
            path = %dest_path.display(),
            size_bytes = size_bytes,
            "encrypted attachment file stored"
        );

        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for LocalVault {
    async fn initialise(&self) -> Result<(), AppError> {
        for dir in [&self.staging_root, &self.durable_root] {
            Self::ensure_directory(dir).await?;
        }
        Ok(())
    }

    async fn hold(&self, upload: RawUpload) -> Result<Attachment, AppError> {
        if upload.file_name.is_empty()
            || upload.file_name.contains('/')
            || upload.file_name.contains('\\')
            || upload.file_name.contains("..")
        {
            return Err(AppError::InvalidInput(format!(
                "invalid file name: {:?}",
                upload.file_name
            )));
        }

        let mut attachment = Attachment::new(&upload);

        // Tolerant of already-exists races; anything else is fatal.
        let staging_dir = self.staging_root.join(attachment.uid.to_string());
        Self::ensure_directory(&staging_dir).await?;

        let staged_path = staging_dir.join(&attachment.file_name);
        let mut dest = fs::File::create(&staged_path).await.map_err(|e| {
            AppError::Internal(format!("failed to create {}: {}", staged_path.display(), e))
        })?;

        let mut content = upload.content;
        let size_bytes = tokio::io::copy(&mut content, &mut dest).await?;
        dest.sync_all().await?;

        attachment.local_path = Some(staged_path.clone());

        tracing::info!(
            uid = %attachment.uid,
            path = %staged_path.display(),
            size_bytes = size_bytes,
            "upload staged"
        );

        Ok(attachment)
    }

    async fn upload(&self, attachment: &Attachment, key: &str) -> Result<(), AppError> {
        if attachment.local_path.is_none() {
            return Err(AppError::InvalidInput(
                "attachment has no staged local file".to_string(),
            ));
        }

        let durable_dir = self.durable_root.join(attachment.uid.to_string());
        Self::ensure_directory(&durable_dir).await?;

        for (file_path, preview) in attachment.local_files() {
            self.persist_file(&durable_dir, attachment.uid, file_path, preview, key)
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
        let object_name = naming::object_name(attachment.uid, preview);
        let path = self
            .durable_root
            .join(attachment.uid.to_string())
            .join(&object_name);

        let source = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!(
                    "encrypted object {} not found",
                    object_name
                )));
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "failed to open {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let decrypted = self.encryption.decrypt_stream(Box::pin(source), key).await?;

        let stream =
            tokio_util::io::ReaderStream::new(decrypted).map(|result| result.map_err(Into::into));

        Ok(Box::pin(stream))
    }

    async fn delete(&self, attachment_uid: Uuid) -> Result<(), AppError> {
        let dir = self.durable_root.join(attachment_uid.to_string());
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!(uid = %attachment_uid, "durable objects deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!(
                "failed to delete {}: {}",
                dir.display(),
                e
            ))),
        }
    }
}
