//! Blog metadata (preferences) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tev_common::db::models::{Metadata, PostType, StaticListData, DEFAULT_THEME};
use tev_common::db::{self, metadata};
use tev_common::Error;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::AppState;

/// Replace an unknown theme with the default one
fn with_valid_theme(mut md: Metadata) -> Metadata {
    if !md.has_valid_theme() {
        warn!("Blog {} has unknown theme '{}'", md.blog, md.theme);
        md.theme = DEFAULT_THEME.to_string();
    }
    md
}

/// GET /api/types
pub async fn post_types() -> Json<Vec<PostType>> {
    Json(PostType::ALL.to_vec())
}

/// GET /api/metadata
///
/// An empty database yields one unsaved default entry so the UI has
/// preferences to start from.
pub async fn list_metadata(State(state): State<AppState>) -> ApiResult<Json<Vec<Metadata>>> {
    let mut conn = state.db.acquire().await?;
    let mut all: Vec<Metadata> = metadata::list(&mut conn)
        .await?
        .into_iter()
        .map(with_valid_theme)
        .collect();

    if all.is_empty() {
        let mut md = Metadata::new_default("");
        md.is_default = true;
        all.push(md);
    }
    Ok(Json(all))
}

/// GET /api/metadata/:id
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Metadata>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(with_valid_theme(metadata::get(&mut conn, id).await?)))
}

/// PUT /api/metadata/:id
pub async fn update_metadata(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut md): Json<Metadata>,
) -> ApiResult<Json<Metadata>> {
    if !md.has_valid_theme() {
        return Err(Error::InvalidTheme(md.theme).into());
    }
    md.id = id;

    let mut tx = state.db.begin().await?;
    let mut saved = metadata::save(&mut tx, &md).await?;
    if saved.is_default {
        saved = metadata::mark_default(&mut tx, saved.id).await?;
    } else if let Some(promoted) = metadata::ensure_default(&mut tx).await? {
        info!("Blog {} is now the default", promoted.blog);
        if promoted.id == saved.id {
            saved = promoted;
        }
    }
    tx.commit().await?;
    Ok(Json(saved))
}

/// DELETE /api/metadata/:id
///
/// Removes the blog and everything stored for it. The last blog cannot be
/// deleted.
pub async fn delete_metadata(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    if metadata::count(&mut tx).await? <= 1 {
        return Err(Error::UnableToDeleteMetadata.into());
    }

    let md = metadata::get(&mut tx, id).await?;
    db::delete_blog_data(&mut tx, &md.blog).await?;
    metadata::delete(&mut tx, id).await?;

    if let Some(promoted) = metadata::ensure_default(&mut tx).await? {
        info!("Blog {} is now the default", promoted.blog);
    }
    tx.commit().await?;

    info!("Deleted blog {} and its data", md.blog);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/metadata/:id/markAsDefault
pub async fn mark_as_default(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Metadata>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(metadata::mark_default(&mut conn, id).await?))
}

/// GET /api/metadata/default
pub async fn default_metadata(State(state): State<AppState>) -> ApiResult<Json<Metadata>> {
    let mut conn = state.db.acquire().await?;
    let md = metadata::find_default(&mut conn).await?.ok_or(Error::NoMetadata)?;
    Ok(Json(with_valid_theme(md)))
}

/// GET /api/metadata/default/blogName
pub async fn default_blog_name(State(state): State<AppState>) -> ApiResult<Json<String>> {
    let mut conn = state.db.acquire().await?;
    let md = metadata::find_default(&mut conn).await?.ok_or(Error::NoMetadata)?;
    Ok(Json(md.blog))
}

/// GET /api/metadata/byBlog/:blog
pub async fn metadata_for_blog(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Metadata>> {
    let mut conn = state.db.acquire().await?;
    let md = metadata::find_by_blog(&mut conn, &blog)
        .await?
        .ok_or_else(|| Error::not_found("Metadata", "blog", &blog))?;
    Ok(Json(with_valid_theme(md)))
}

/// GET /api/metadata/byBlog/:blog/orDefault
pub async fn metadata_for_blog_or_default(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Metadata>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(with_valid_theme(metadata::get_or_create(&mut conn, &blog).await?)))
}

/// GET /api/metadata/staticListData
pub async fn static_list_data() -> Json<StaticListData> {
    Json(StaticListData::default())
}

pub fn metadata_routes() -> Router<AppState> {
    Router::new()
        .route("/api/types", get(post_types))
        .route("/api/metadata", get(list_metadata))
        .route("/api/metadata/default", get(default_metadata))
        .route("/api/metadata/default/blogName", get(default_blog_name))
        .route("/api/metadata/staticListData", get(static_list_data))
        .route("/api/metadata/byBlog/:blog", get(metadata_for_blog))
        .route(
            "/api/metadata/byBlog/:blog/orDefault",
            get(metadata_for_blog_or_default),
        )
        .route(
            "/api/metadata/:id",
            get(get_metadata).put(update_metadata).delete(delete_metadata),
        )
        .route("/api/metadata/:id/markAsDefault", put(mark_as_default))
}
