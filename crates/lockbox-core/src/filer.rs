//! Filer contract — the metadata record store
//!
//! Persists the immutable descriptive fields of an attachment after it has
//! been durably stored, and resolves an identifier back to those fields
//! before download. `record` must only be called after the storage upload
//! succeeded, so metadata is never visible for an object that failed to
//! persist.

use crate::models::Attachment;
use crate::AppError;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Filer: Send + Sync {
    /// Persist the attachment's descriptive fields.
    async fn record(&self, attachment: &Attachment) -> Result<(), AppError>;

    /// Resolve a UID back to a lightweight attachment (no local paths).
    async fn fetch(&self, uid: Uuid) -> Result<Attachment, AppError>;

    /// Remove the metadata record for a UID.
    async fn delete(&self, uid: Uuid) -> Result<(), AppError>;
}
