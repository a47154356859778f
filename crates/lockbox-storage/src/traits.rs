//! Storage abstraction trait
//!
//! This module defines the `AttachmentStore` trait that all storage backends
//! must implement. The request handler works against this trait and never
//! against a concrete backend.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use lockbox_core::{AppError, Attachment, RawUpload};
use std::pin::Pin;
use uuid::Uuid;

/// Stream of decrypted attachment bytes returned by `download`.
///
/// Dropping the stream releases every underlying resource (decryption
/// buffer, file handle or transport response) in reverse acquisition order.
pub type DownloadStream = Pin<Box<dyn Stream<Item = Result<Bytes, AppError>> + Send>>;

/// Backend-agnostic contract for holding, persisting and retrieving an
/// uploaded attachment.
///
/// Operations are request-scoped and cancel-safe: dropping the returned
/// future aborts the underlying I/O without leaving an object visible as
/// "stored".
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Idempotent setup of durable locations (directories, staging roots).
    async fn initialise(&self) -> Result<(), AppError>;

    /// Stage a raw upload on local disk under a fresh identity and return
    /// the resulting attachment. No encryption or persistence happens here.
    async fn hold(&self, upload: RawUpload) -> Result<Attachment, AppError>;

    /// Encrypt and durably persist every local file belonging to the
    /// attachment (the original, and the preview when present) under the
    /// caller-supplied key.
    async fn upload(&self, attachment: &Attachment, key: &str) -> Result<(), AppError>;

    /// Fetch and decrypt the requested variant of a stored attachment.
    async fn download(
        &self,
        attachment: &Attachment,
        preview: bool,
        key: &str,
    ) -> Result<DownloadStream, AppError>;

    /// Remove the durable objects for an attachment. A missing preview
    /// object is not an error.
    async fn delete(&self, attachment_uid: Uuid) -> Result<(), AppError>;
}
