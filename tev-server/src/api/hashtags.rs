//! Hashtag endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tev_common::db::hashtags;
use tev_common::db::models::Hashtag;
use tev_common::Error;

use crate::error::ApiResult;
use crate::AppState;

/// Identifies one hashtag row; no blog means a hand-made tag
#[derive(Debug, Deserialize)]
pub struct HashtagKey {
    pub tag: String,
    #[serde(default)]
    pub blog: Option<String>,
}

/// Tags are stored lower-cased, like the ones read from exports
fn normalize_tag(body: &str) -> Result<String, Error> {
    let tag = body.trim().trim_start_matches('#').to_lowercase();
    if tag.is_empty() {
        return Err(Error::InvalidInput("Hashtag must not be empty".to_string()));
    }
    Ok(tag)
}

/// GET /api/hashtags
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Hashtag>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(hashtags::list_merged(&mut conn).await?))
}

/// POST /api/hashtags (body: tag text)
pub async fn create_unassigned(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<(StatusCode, Json<Hashtag>)> {
    let tag = normalize_tag(&body)?;
    let mut conn = state.db.acquire().await?;
    let created = hashtags::create_unassigned(&mut conn, &tag).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/hashtags (body: `{tag, blog}`)
pub async fn delete_one(
    State(state): State<AppState>,
    Json(key): Json<HashtagKey>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    hashtags::delete(&mut conn, &key.tag, key.blog.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/hashtags/:blog
pub async fn list_for_blog(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<Hashtag>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(hashtags::list_for_blog(&mut conn, &blog).await?))
}

/// POST /api/hashtags/:blog (body: tag text)
pub async fn add_for_blog(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    body: String,
) -> ApiResult<Json<Hashtag>> {
    let tag = normalize_tag(&body)?;
    let mut conn = state.db.acquire().await?;
    Ok(Json(hashtags::increment(&mut conn, &tag, &blog).await?))
}

/// DELETE /api/hashtags/:blog
pub async fn delete_for_blog(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    hashtags::delete_all_for_blog(&mut conn, &blog).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn hashtag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/hashtags",
            get(list_all).post(create_unassigned).delete(delete_one),
        )
        .route(
            "/api/hashtags/:blog",
            get(list_for_blog).post(add_for_blog).delete(delete_for_blog),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_lowercased() {
        assert_eq!(normalize_tag("  #Rust\n").unwrap(), "rust");
        assert!(matches!(normalize_tag(" # "), Err(Error::InvalidInput(_))));
    }
}
