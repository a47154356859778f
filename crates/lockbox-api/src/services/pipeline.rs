//! Attachment pipeline orchestration
//!
//! The write path runs Hold → Scan → Scale → Preview → Upload → Record.
//! Failures before `upload` leave only staged files behind; failures after a
//! successful upload leave a durable copy whose re-record is idempotent.

use crate::state::AppState;
use lockbox_core::{AppError, Attachment, RawUpload};
use lockbox_processing::ScanOutcome;
use lockbox_storage::DownloadStream;
use uuid::Uuid;

/// Owner assigned to uploads until per-user authentication is wired in.
pub const DEFAULT_OWNER_ID: i64 = 1;

/// Stage, transform and persist a raw upload under the given encryption key.
pub async fn process_upload(
    state: &AppState,
    upload: RawUpload,
    key: &str,
) -> Result<Attachment, AppError> {
    let mut attachment = state.store.hold(upload).await?;
    let local_path = attachment
        .local_path
        .clone()
        .ok_or_else(|| AppError::Internal("staging produced no local path".to_string()))?;

    tracing::info!(
        uid = %attachment.uid,
        file_name = %attachment.file_name,
        content_type = %attachment.content_type,
        "upload staged"
    );

    if state.scanner.scan(&local_path).await? == ScanOutcome::IssueDetected {
        return Err(AppError::InvalidInput(
            "upload rejected by content scanner".to_string(),
        ));
    }

    // Unlike previews, scaling is not best effort: a content type the scaler
    // cannot handle fails the whole upload.
    if !state.scaler.supported(&attachment.content_type) {
        return Err(AppError::InvalidInput(format!(
            "unsupported content type: {}",
            attachment.content_type
        )));
    }
    state
        .scaler
        .scale(&local_path, state.config.max_image_width, &attachment.content_type)
        .await?;

    if let Some(preview_path) = attachment.derive_preview_path() {
        attachment.copy_to(&preview_path).await?;
        state
            .previews
            .generate(&attachment, state.config.preview_width)
            .await?;
    }

    state.store.upload(&attachment, key).await?;
    state.filer.record(&attachment).await?;

    tracing::info!(uid = %attachment.uid, "attachment persisted");
    Ok(attachment)
}

/// Resolve an attachment's metadata and open a decrypting download stream.
pub async fn open_download(
    state: &AppState,
    uid: Uuid,
    preview: bool,
    key: &str,
) -> Result<(Attachment, DownloadStream), AppError> {
    let attachment = state.filer.fetch(uid).await?;
    let stream = state.store.download(&attachment, preview, key).await?;
    Ok((attachment, stream))
}

/// Remove an attachment's durable copies and its metadata record.
pub async fn remove_attachment(state: &AppState, uid: Uuid) -> Result<(), AppError> {
    state.store.delete(uid).await?;
    state.filer.delete(uid).await?;
    tracing::info!(uid = %uid, "attachment removed");
    Ok(())
}
