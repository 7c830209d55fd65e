//! Upload of Tumblr export documents
//!
//! The request body is the XML document itself.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    routing::post,
    Json, Router,
};

use crate::error::ApiResult;
use crate::services::import::{self, ConversationImportSummary, ImportSummary};
use crate::AppState;

/// Largest accepted export document
pub const MAX_IMPORT_BYTES: usize = 512 * 1024 * 1024;

/// POST /api/import/:blog/posts
pub async fn import_posts(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(import::import_posts(&state.db, &blog, &body).await?))
}

/// POST /api/import/:blog/conversations
pub async fn import_conversations(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ConversationImportSummary>> {
    Ok(Json(import::import_conversations(&state.db, &blog, &body).await?))
}

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/api/import/:blog/posts", post(import_posts))
        .route("/api/import/:blog/conversations", post(import_conversations))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES))
}
