//! Photo endpoints; a photo post has one row per photo

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tev_common::db::models::Photo;
use tev_common::db::{photos, posts};
use tev_common::Error;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/posts/:blog/photos
pub async fn list_photos(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<Photo>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(photos::list_for_blog(&mut conn, &blog).await?))
}

/// DELETE /api/posts/:blog/photos
pub async fn delete_photos(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    photos::delete_all_for_blog(&mut conn, &blog).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/:blog/photo
pub async fn create_photo(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    Json(photo): Json<Photo>,
) -> ApiResult<(StatusCode, Json<Photo>)> {
    let mut conn = state.db.acquire().await?;
    if !posts::exists(&mut conn, &blog, &photo.post_id).await? {
        return Err(Error::NoParentPost(photo.post_id).into());
    }
    let stored = photos::insert(&mut conn, &photo).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/posts/:blog/:id/photo
pub async fn photos_for_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Photo>>> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    Ok(Json(photos::list_for_post(&mut conn, &id).await?))
}

/// PUT /api/posts/:blog/:id/photo
///
/// The photo to change is named by the `id` in the body.
pub async fn update_photo(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
    Json(mut photo): Json<Photo>,
) -> ApiResult<Json<Photo>> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    photo.post_id = id;
    photos::update(&mut conn, &photo).await?;
    Ok(Json(photos::get(&mut conn, photo.id).await?))
}

/// DELETE /api/posts/:blog/:id/photo
pub async fn delete_photos_for_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    photos::delete_for_post(&mut conn, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn photo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/posts/:blog/photos",
            get(list_photos).delete(delete_photos),
        )
        .route("/api/posts/:blog/photo", post(create_photo))
        .route(
            "/api/posts/:blog/:id/photo",
            get(photos_for_post)
                .put(update_photo)
                .delete(delete_photos_for_post),
        )
}
