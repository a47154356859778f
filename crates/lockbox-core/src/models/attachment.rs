//! Attachment entity — the unit of work moving through the upload pipeline
//!
//! Created when a raw upload is first staged (UID assigned, descriptive
//! attributes captured), mutated by derivative generation (preview path
//! populated), consumed by persistence. After the encrypted copies are
//! committed the local paths are no longer authoritative; attachments
//! reconstructed from the filer carry no local paths at all.

use crate::models::RawUpload;
use crate::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Marker inserted before the final extension of a preview file name.
const PREVIEW_MARKER: &str = ".preview";

#[derive(Debug, Clone)]
pub struct Attachment {
    /// Globally unique identifier, assigned at staging time and immutable.
    pub uid: Uuid,
    pub owner_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub extension: String,
    pub content_type: String,
    /// Where the staged original currently lives on local disk. Transient;
    /// only meaningful between staging and persistence.
    pub local_path: Option<PathBuf>,
    /// Where the preview derivative lives on local disk, when one exists.
    pub preview_local_path: Option<PathBuf>,
}

impl Attachment {
    /// Create a new attachment from an inbound upload's declared metadata.
    /// Local paths are populated later, by staging and preview derivation.
    pub fn new(upload: &RawUpload) -> Self {
        Self {
            uid: Uuid::new_v4(),
            owner_id: upload.owner_id,
            file_name: upload.file_name.clone(),
            file_size: upload.declared_size,
            extension: file_extension(&upload.file_name),
            content_type: upload.content_type.clone(),
            local_path: None,
            preview_local_path: None,
        }
    }

    /// Reconstruct a lightweight attachment from recorded metadata. No local
    /// paths: the working files are long gone by the time this is used.
    pub fn from_record(
        uid: Uuid,
        owner_id: i64,
        file_name: String,
        file_size: i64,
        extension: String,
        content_type: String,
    ) -> Self {
        Self {
            uid,
            owner_id,
            file_name,
            file_size,
            extension,
            content_type,
            local_path: None,
            preview_local_path: None,
        }
    }

    /// Derive and set the preview local path from the original local path,
    /// inserting `.preview` before the final extension of the file name.
    ///
    /// Returns `None` (leaving the attachment untouched) when the attachment
    /// has no local path or the file name has no usable extension.
    pub fn derive_preview_path(&mut self) -> Option<PathBuf> {
        let local_path = self.local_path.as_ref()?;
        let preview_name = preview_file_name(&self.file_name)?;
        let preview_path = local_path.with_file_name(preview_name);
        self.preview_local_path = Some(preview_path.clone());
        Some(preview_path)
    }

    /// The local files belonging to this attachment, as `(path, is_preview)`
    /// pairs: the original first, then the preview when present.
    pub fn local_files(&self) -> impl Iterator<Item = (&Path, bool)> {
        self.local_path
            .as_deref()
            .map(|p| (p, false))
            .into_iter()
            .chain(self.preview_local_path.as_deref().map(|p| (p, true)))
    }

    /// Copy the staged original byte-for-byte to another local path.
    pub async fn copy_to(&self, dest: &Path) -> Result<(), AppError> {
        let source = self
            .local_path
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("attachment has no local path".to_string()))?;
        tokio::fs::copy(source, dest).await?;
        Ok(())
    }
}

/// Everything after the last `.` in the file name, case preserved as given.
/// Empty when there is no extension.
fn file_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name[idx + 1..].to_string(),
        _ => String::new(),
    }
}

/// Insert the preview marker before the final extension: `name.ext` becomes
/// `name.preview.ext`. File names without an extension (or with only a
/// leading dot) yield `None`.
fn preview_file_name(file_name: &str) -> Option<String> {
    let idx = file_name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some(format!(
        "{}{}{}",
        &file_name[..idx],
        PREVIEW_MARKER,
        &file_name[idx..]
    ))
}

/// API representation of a recorded attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentResponse {
    pub uid: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub content_type: String,
}

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            uid: attachment.uid,
            file_name: attachment.file_name.clone(),
            file_size: attachment.file_size,
            content_type: attachment.content_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged_attachment(file_name: &str) -> Attachment {
        let upload = RawUpload::from_bytes(file_name, "image/png", 1, vec![1, 2, 3]);
        let mut attachment = Attachment::new(&upload);
        attachment.local_path = Some(PathBuf::from(format!("/tmp/staging/{}", file_name)));
        attachment
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.PNG"), "PNG");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "");
        assert_eq!(file_extension(".hidden"), "");
    }

    #[test]
    fn test_derive_preview_path_inserts_marker() {
        let mut attachment = staged_attachment("photo.png");
        let preview = attachment.derive_preview_path().unwrap();
        assert_eq!(preview, PathBuf::from("/tmp/staging/photo.preview.png"));
        assert_eq!(attachment.preview_local_path, Some(preview));
    }

    #[test]
    fn test_derive_preview_path_no_extension() {
        let mut attachment = staged_attachment("noext");
        assert!(attachment.derive_preview_path().is_none());
        assert!(attachment.preview_local_path.is_none());
    }

    #[test]
    fn test_derive_preview_path_requires_staging() {
        let upload = RawUpload::from_bytes("photo.png", "image/png", 1, vec![]);
        let mut attachment = Attachment::new(&upload);
        assert!(attachment.derive_preview_path().is_none());
    }

    #[test]
    fn test_local_files_order() {
        let mut attachment = staged_attachment("photo.png");
        attachment.derive_preview_path();

        let files: Vec<_> = attachment.local_files().collect();
        assert_eq!(files.len(), 2);
        assert!(!files[0].1);
        assert!(files[1].1);
    }

    #[test]
    fn test_captures_declared_metadata() {
        let upload = RawUpload::from_bytes("doc.JPEG", "image/jpeg", 7, vec![0; 42]);
        let attachment = Attachment::new(&upload);
        assert_eq!(attachment.owner_id, 7);
        assert_eq!(attachment.file_size, 42);
        assert_eq!(attachment.extension, "JPEG");
        assert_eq!(attachment.content_type, "image/jpeg");
        assert!(attachment.local_path.is_none());
    }
}
