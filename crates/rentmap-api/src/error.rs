//! Error types for rentmap-api

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for rentmap-api operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by API handlers and the server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// Error from rentmap-core
    #[error(transparent)]
    Core(#[from] rentmap_core::Error),

    /// Place with no data in any year
    #[error("Unknown place: {0}")]
    UnknownPlace(String),

    /// Listener could not be bound or the server failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::UnknownPlace(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
