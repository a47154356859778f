use crate::error::HttpAppError;
use crate::services::pipeline;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

/// DELETE /api/v0/attachments/{uid}
///
/// Removes the durable copies and the metadata record. Idempotent: deleting
/// an already-removed attachment still returns 204.
pub async fn delete_attachment(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    pipeline::remove_attachment(&state, uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
