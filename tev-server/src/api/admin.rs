//! Administration tools: bulk read state and media folder maintenance

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tev_common::db::models::{Post, PostType};
use tev_common::db::posts;

use crate::error::ApiResult;
use crate::locale::{message, Locale, MessageKey};
use crate::services::media;
use crate::AppState;

/// Result of an admin action, with a message in the request locale
#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub count: usize,
    pub message: String,
}

impl AdminResponse {
    pub fn new(locale: &Locale, key: MessageKey, count: usize) -> Self {
        Self {
            count,
            message: message(locale, key, count),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportImagesRequest {
    pub source: PathBuf,
}

/// GET /admintools/posts/:blog/type/:type
pub async fn posts_by_type(
    State(state): State<AppState>,
    Path((blog, post_type)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Post>>> {
    let post_type: PostType = post_type.parse()?;
    let mut conn = state.db.acquire().await?;
    Ok(Json(posts::list_for_blog_and_type(&mut conn, &blog, post_type).await?))
}

/// PUT /admintools/posts/:blog/markAllRead
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(locale): Extension<Locale>,
    Path(blog): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let mut conn = state.db.acquire().await?;
    let changed = posts::set_read_for_blog(&mut conn, &blog, true).await?;
    Ok(Json(AdminResponse::new(&locale, MessageKey::MarkedAllRead, changed as usize)))
}

/// PUT /admintools/posts/:blog/markAllUnread
pub async fn mark_all_unread(
    State(state): State<AppState>,
    Extension(locale): Extension<Locale>,
    Path(blog): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let mut conn = state.db.acquire().await?;
    let changed = posts::set_read_for_blog(&mut conn, &blog, false).await?;
    Ok(Json(AdminResponse::new(&locale, MessageKey::MarkedAllUnread, changed as usize)))
}

/// POST /admintools/posts/:blog/cleanImagesOnHD
pub async fn clean_images(
    State(state): State<AppState>,
    Extension(locale): Extension<Locale>,
    Path(blog): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let removed = media::clean_images(&state.db, &blog).await?;
    Ok(Json(AdminResponse::new(&locale, MessageKey::ImagesCleaned, removed)))
}

/// POST /admintools/posts/:blog/importImages
pub async fn import_images(
    State(state): State<AppState>,
    Extension(locale): Extension<Locale>,
    Path(blog): Path<String>,
    Json(request): Json<ImportImagesRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let copied = media::import_images(&state.db, &blog, &request.source).await?;
    Ok(Json(AdminResponse::new(&locale, MessageKey::ImagesImported, copied)))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admintools/posts/:blog/type/:type", get(posts_by_type))
        .route("/admintools/posts/:blog/markAllRead", put(mark_all_read))
        .route("/admintools/posts/:blog/markAllUnread", put(mark_all_unread))
        .route("/admintools/posts/:blog/cleanImagesOnHD", post(clean_images))
        .route("/admintools/posts/:blog/importImages", post(import_images))
}
