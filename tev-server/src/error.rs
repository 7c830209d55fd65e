//! HTTP error mapping
//!
//! Handlers return [`ApiResult`]; failures become `{"error": "..."}` bodies
//! with a status chosen by error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tev_common::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound { .. } | Error::NoMetadata => StatusCode::NOT_FOUND,
            Error::Xml(_)
            | Error::NoParentPost(_)
            | Error::InvalidType(_)
            | Error::InvalidTheme(_)
            | Error::BlogMismatch { .. }
            | Error::ExistingTag(_)
            | Error::UnableToDeleteMetadata
            | Error::NoStagedPosts(_)
            | Error::InvalidConvoParent { .. }
            | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Download(_) => StatusCode::FAILED_DEPENDENCY,
            Error::Database(_) | Error::Io(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError(Error::Database(e))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError(Error::Io(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_status() {
        assert_eq!(
            ApiError(Error::not_found("Post", "id", "1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(Error::NoStagedPosts("blog".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(Error::Download("timeout".into())).status(),
            StatusCode::FAILED_DEPENDENCY
        );
        assert_eq!(
            ApiError(Error::Io(std::io::Error::other("disk"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
