//! Files from a blog's media folder, for the viewer

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::services::media;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    /// Blog whose folder to read; the default blog when absent
    pub blog: Option<String>,
}

async fn serve(state: &AppState, name: &str, blog: Option<&str>, no_cache: bool) -> ApiResult<Response> {
    let file = media::read_media(&state.db, blog, name).await?;
    let cache = if no_cache { "no-cache" } else { "max-age=3600" };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CACHE_CONTROL, cache),
        ],
        file.bytes,
    )
        .into_response())
}

/// GET /viewerMedia/:name
pub async fn viewer_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Response> {
    serve(&state, &name, query.blog.as_deref(), false).await
}

/// GET /viewerVideo/:name
pub async fn viewer_video(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Response> {
    serve(&state, &name, query.blog.as_deref(), true).await
}

pub fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/viewerMedia/:name", get(viewer_media))
        .route("/viewerVideo/:name", get(viewer_video))
}
