use crate::handlers::{delete, download, upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete as delete_route, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Uploads larger than this are rejected before they reach staging.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v0/attachments", post(upload::upload_attachment))
        .route(
            "/api/v0/attachments/{uid}/file",
            get(download::download_attachment),
        )
        .route(
            "/api/v0/attachments/{uid}",
            delete_route(delete::delete_attachment),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
