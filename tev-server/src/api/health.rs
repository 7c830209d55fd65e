//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::api::buildinfo::get_build_info;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "tev-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health and build information routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/buildinfo", get(get_build_info))
}
