//! Raw upload descriptor
//!
//! Decouples the storage pipeline from the network layer: whatever parses the
//! inbound request (multipart, presigned PUT, a test) hands the core a
//! `RawUpload` with declared metadata and an async byte source.

use crate::encryption::ByteReader;
use std::io::Cursor;

pub struct RawUpload {
    /// Original file name as declared by the uploader.
    pub file_name: String,
    /// Declared byte size from the inbound upload metadata.
    pub declared_size: i64,
    /// Declared MIME type.
    pub content_type: String,
    /// Identifier of the requesting principal.
    pub owner_id: i64,
    /// The upload's content stream.
    pub content: ByteReader,
}

impl RawUpload {
    /// Build an upload from an in-memory buffer. The declared size is taken
    /// from the buffer length.
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        owner_id: i64,
        data: Vec<u8>,
    ) -> Self {
        let declared_size = data.len() as i64;
        Self {
            file_name: file_name.into(),
            declared_size,
            content_type: content_type.into(),
            owner_id,
            content: Box::pin(Cursor::new(data)),
        }
    }
}
