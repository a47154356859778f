use crate::error::HttpAppError;
use crate::handlers::require_encryption_key;
use crate::services::pipeline;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use futures::StreamExt;
use lockbox_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Serve the preview derivative instead of the original.
    #[serde(default)]
    preview: bool,
}

/// GET /api/v0/attachments/{uid}/file
///
/// Streams the decrypted attachment body. `?preview=true` selects the
/// preview derivative when one was persisted.
pub async fn download_attachment(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let key = require_encryption_key(&headers)?;

    let (attachment, stream) =
        pipeline::open_download(&state, uid, query.preview, &key).await?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("download stream error: {}", e)))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.file_name),
        )
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build download response");
            HttpAppError(AppError::Internal(e.to_string()))
        })
}
