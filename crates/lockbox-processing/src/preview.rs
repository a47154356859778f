//! Preview generation registry
//!
//! Previews are produced best effort: generators are selected by MIME type
//! through a registry, and content types with no registered generator are
//! skipped silently — the original upload must still succeed without one.

use crate::scaler::ImageScaler;
use async_trait::async_trait;
use lockbox_core::{AppError, Attachment};
use std::collections::HashMap;
use std::sync::Arc;

/// Target width for generated previews.
pub const DEFAULT_PREVIEW_WIDTH: u32 = 320;

#[async_trait]
pub trait PreviewGenerator: Send + Sync {
    /// Turn the attachment's staged preview copy into an actual preview.
    async fn generate(&self, attachment: &Attachment, preview_width: u32)
        -> Result<(), AppError>;
}

/// Registry mapping MIME types onto preview generators.
#[derive(Default)]
pub struct PreviewService {
    handlers: HashMap<String, Arc<dyn PreviewGenerator>>,
}

impl PreviewService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, content_type: impl Into<String>, handler: Arc<dyn PreviewGenerator>) {
        self.handlers.insert(content_type.into(), handler);
    }

    /// Generate a preview for the attachment, or skip silently when no
    /// generator is registered for its content type.
    pub async fn generate(
        &self,
        attachment: &Attachment,
        preview_width: u32,
    ) -> Result<(), AppError> {
        let Some(handler) = self.handlers.get(&attachment.content_type) else {
            tracing::debug!(
                uid = %attachment.uid,
                content_type = %attachment.content_type,
                "no preview generator registered, skipping"
            );
            return Ok(());
        };
        handler.generate(attachment, preview_width).await
    }
}

/// Preview generator for image attachments: width-caps the preview copy with
/// the same scaler the pipeline uses for originals.
pub struct ImagePreviewGenerator {
    scaler: Arc<ImageScaler>,
}

impl ImagePreviewGenerator {
    pub fn new(scaler: Arc<ImageScaler>) -> Self {
        Self { scaler }
    }
}

#[async_trait]
impl PreviewGenerator for ImagePreviewGenerator {
    async fn generate(
        &self,
        attachment: &Attachment,
        preview_width: u32,
    ) -> Result<(), AppError> {
        let preview_path = attachment.preview_local_path.as_deref().ok_or_else(|| {
            AppError::Processing("attachment has no staged preview copy".to_string())
        })?;

        self.scaler
            .scale(preview_path, preview_width, &attachment.content_type)
            .await
    }
}
