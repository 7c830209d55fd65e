//! tev-server library - Tumblr Export Viewer HTTP service
//!
//! Imports Tumblr post and messaging exports into SQLite and serves them to
//! the browser UI through a JSON API.

use axum::{middleware, Router};
use sqlx::SqlitePool;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod locale;
pub mod services;

/// Timeout for photo downloads
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Client used to download photos referenced by posts
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { db, http }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .merge(api::post_routes())
        .merge(api::content_routes())
        .merge(api::photo_routes())
        .merge(api::hashtag_routes())
        .merge(api::metadata_routes())
        .merge(api::conversation_routes())
        .merge(api::staging_routes())
        .merge(api::admin_routes())
        .merge(api::import_routes())
        .merge(api::media_routes())
        .layer(middleware::from_fn(locale::locale_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
