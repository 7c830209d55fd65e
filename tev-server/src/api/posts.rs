//! Post endpoints, including the read and favourite markers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tev_common::db::content;
use tev_common::db::models::{Answer, BlogContents, Link, Post, Regular, Video};
use tev_common::db::{photos, posts};
use tev_common::Error;
use tracing::info;

use crate::error::ApiResult;
use crate::services::media;
use crate::AppState;

/// GET /api/posts/:blog
pub async fn list_posts(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(posts::list_for_blog(&mut conn, &blog).await?))
}

/// POST /api/posts/:blog
pub async fn create_post(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    Json(post): Json<Post>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    if post.tumblelog != blog {
        return Err(Error::BlogMismatch {
            blog,
            found: post.tumblelog,
        }
        .into());
    }

    let mut conn = state.db.acquire().await?;
    if posts::find(&mut conn, &post.id).await?.is_some() {
        return Err(Error::InvalidInput(format!("Post {} already exists", post.id)).into());
    }
    posts::insert(&mut conn, &post).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// DELETE /api/posts/:blog
pub async fn delete_posts(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    let deleted = posts::delete_all_for_blog(&mut conn, &blog).await?;
    info!("Deleted {} posts of blog {}", deleted, blog);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/posts/:blog/contents
pub async fn blog_contents(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<BlogContents>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(BlogContents {
        posts: posts::list_for_blog(&mut conn, &blog).await?,
        answers: content::list_for_blog::<Answer>(&mut conn, &blog).await?,
        links: content::list_for_blog::<Link>(&mut conn, &blog).await?,
        photos: photos::list_for_blog(&mut conn, &blog).await?,
        regulars: content::list_for_blog::<Regular>(&mut conn, &blog).await?,
        videos: content::list_for_blog::<Video>(&mut conn, &blog).await?,
    }))
}

/// GET /api/posts/:blog/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(posts::get(&mut conn, &blog, &id).await?))
}

/// PUT /api/posts/:blog/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
    Json(details): Json<Post>,
) -> ApiResult<Json<Post>> {
    let mut conn = state.db.acquire().await?;
    let mut post = posts::get(&mut conn, &blog, &id).await?;
    post.update_data(&details);
    post.tumblelog = blog;
    posts::update(&mut conn, &post).await?;
    Ok(Json(post))
}

/// DELETE /api/posts/:blog/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    posts::delete(&mut conn, &blog, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_read(state: AppState, blog: String, id: String, read: bool) -> ApiResult<Json<Post>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(posts::set_read(&mut conn, &blog, &id, read).await?))
}

async fn set_favourite(
    state: AppState,
    blog: String,
    id: String,
    favourite: bool,
) -> ApiResult<Json<Post>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(posts::set_favourite(&mut conn, &blog, &id, favourite).await?))
}

/// PUT /api/posts/:blog/:id/markRead
pub async fn mark_read(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    set_read(state, blog, id, true).await
}

/// PUT /api/posts/:blog/:id/markUnread
pub async fn mark_unread(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    set_read(state, blog, id, false).await
}

/// PUT /api/posts/:blog/:id/markFavourite
pub async fn mark_favourite(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    set_favourite(state, blog, id, true).await
}

/// PUT /api/posts/:blog/:id/markNonFavourite
pub async fn mark_non_favourite(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    set_favourite(state, blog, id, false).await
}

/// POST /api/posts/:blog/:id/fixPhotos
///
/// Downloads the post's photos into the blog's media folder; `false` when
/// any download failed.
pub async fn fix_photos(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<bool>> {
    Ok(Json(media::fix_photos(&state.db, &state.http, &blog, &id).await?))
}

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/posts/:blog",
            get(list_posts).post(create_post).delete(delete_posts),
        )
        .route("/api/posts/:blog/contents", get(blog_contents))
        .route(
            "/api/posts/:blog/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/:blog/:id/markRead", put(mark_read))
        .route("/api/posts/:blog/:id/markUnread", put(mark_unread))
        .route("/api/posts/:blog/:id/markFavourite", put(mark_favourite))
        .route("/api/posts/:blog/:id/markNonFavourite", put(mark_non_favourite))
        .route("/api/posts/:blog/:id/fixPhotos", post(fix_photos))
}
