use crate::error::HttpAppError;
use crate::handlers::require_encryption_key;
use crate::services::pipeline::{self, DEFAULT_OWNER_ID};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use lockbox_core::{AppError, AttachmentResponse, RawUpload};
use std::sync::Arc;

const FILE_FIELD: &str = "file";

/// POST /api/v0/attachments
///
/// Accepts a multipart body with a single `file` field, stages it, generates
/// derivatives and persists the encrypted copies.
pub async fn upload_attachment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let key = require_encryption_key(&headers)?;

    let mut upload: Option<RawUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("file field has no file name".to_string()))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("failed to read file field: {}", e)))?;

        upload = Some(RawUpload::from_bytes(
            file_name,
            content_type,
            DEFAULT_OWNER_ID,
            data.to_vec(),
        ));
        break;
    }

    let upload = upload.ok_or_else(|| {
        AppError::InvalidInput(format!("missing multipart field: {}", FILE_FIELD))
    })?;

    let attachment = pipeline::process_upload(&state, upload, &key).await?;

    Ok((
        StatusCode::CREATED,
        Json(AttachmentResponse::from(&attachment)),
    ))
}
