//! Endpoints for answers, links, regulars and videos
//!
//! One set of handlers, generic over [`PostContent`], is mounted once per
//! content type under the type's table name.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tev_common::db::content::{self, PostContent};
use tev_common::db::models::{Answer, Link, Regular, Video};
use tev_common::db::posts;
use tev_common::Error;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/posts/:blog/{type}s
pub async fn list_items<T: PostContent>(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<Json<Vec<T>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(content::list_for_blog::<T>(&mut conn, &blog).await?))
}

/// DELETE /api/posts/:blog/{type}s
pub async fn delete_items<T: PostContent>(
    State(state): State<AppState>,
    Path(blog): Path<String>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    content::delete_all_for_blog::<T>(&mut conn, &blog).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/posts/:blog/:id/{type}
pub async fn get_item<T: PostContent>(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<Json<T>> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    let item = content::get::<T>(&mut conn, &id)
        .await?
        .ok_or_else(|| Error::not_found(T::TABLE, "post id", &id))?;
    Ok(Json(item))
}

/// POST /api/posts/:blog/:id/{type}
pub async fn create_item<T: PostContent>(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
    Json(mut item): Json<T>,
) -> ApiResult<(StatusCode, Json<T>)> {
    let mut conn = state.db.acquire().await?;
    if !posts::exists(&mut conn, &blog, &id).await? {
        return Err(Error::NoParentPost(id).into());
    }
    item.set_post_id(id);
    content::save(&mut conn, &item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/posts/:blog/:id/{type}
pub async fn update_item<T: PostContent>(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
    Json(details): Json<T>,
) -> ApiResult<Json<T>> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    let mut item = content::get::<T>(&mut conn, &id)
        .await?
        .ok_or_else(|| Error::not_found(T::TABLE, "post id", &id))?;
    item.update_item(details);
    content::save(&mut conn, &item).await?;
    Ok(Json(item))
}

/// DELETE /api/posts/:blog/:id/{type}
pub async fn delete_item<T: PostContent>(
    State(state): State<AppState>,
    Path((blog, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await?;
    posts::get(&mut conn, &blog, &id).await?;
    if !content::delete::<T>(&mut conn, &id).await? {
        return Err(Error::not_found(T::TABLE, "post id", &id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn routes_for<T: PostContent>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/api/posts/:blog/{}s", T::TABLE),
            get(list_items::<T>).delete(delete_items::<T>),
        )
        .route(
            &format!("/api/posts/:blog/:id/{}", T::TABLE),
            get(get_item::<T>)
                .post(create_item::<T>)
                .put(update_item::<T>)
                .delete(delete_item::<T>),
        )
}

pub fn content_routes() -> Router<AppState> {
    Router::new()
        .merge(routes_for::<Answer>())
        .merge(routes_for::<Link>())
        .merge(routes_for::<Regular>())
        .merge(routes_for::<Video>())
}
