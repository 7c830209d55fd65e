//! Staging: posts picked for re-export

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use tev_common::db::{posts, staging};

use crate::api::admin::AdminResponse;
use crate::error::ApiResult;
use crate::locale::{Locale, MessageKey};
use crate::services::{export, media};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportImagesRequest {
    pub destination: PathBuf,
}

/// GET /staging-api/posts/:blog
pub async fn staged_ids(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(staging::list_ids(&mut conn, &blog).await?))
}

/// DELETE /staging-api/posts/:blog
pub async fn unstage_all(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    staging::unstage_all(&mut conn, &blog).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /staging-api/posts/:blog/:id
pub async fn stage_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    staging::stage(&mut conn, &blog, &id).await?;
    Ok(StatusCode::CREATED)
}

/// DELETE /staging-api/posts/:blog/:id
pub async fn unstage_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    staging::unstage(&mut conn, &blog, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /staging-api/posts/:blog/:id/exportImages
pub async fn export_images(
    State(state): State<AppState>,
    Extension(locale): Extension<Locale>,
    Path((blog, id)): Path<(String, String)>,
    Json(request): Json<ExportImagesRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let copied =
        media::export_images(&state.db, &state.http, &blog, &id, &request.destination).await?;
    Ok(Json(AdminResponse::new(&locale, MessageKey::ImagesExported, copied)))
}

/// GET /stagedPostsDownload/:blog
pub async fn download_staged(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Response> {
    let mut conn = state.db.acquire().await?;
    let document = export::staged_document(&mut conn, &blog).await?;
    let disposition = format!("attachment; filename=\"{}-staged-posts.xml\"", blog);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/xml".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        document,
    )
        .into_response())
}

pub fn staging_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/staging-api/posts/:blog",
            get(staged_ids).delete(unstage_all),
        )
        .route(
            "/staging-api/posts/:blog/:id",
            post(stage_post).delete(unstage_post),
        )
        .route(
            "/staging-api/posts/:blog/:id/exportImages",
            post(export_images),
        )
        .route("/stagedPostsDownload/:blog", get(download_staged))
}
