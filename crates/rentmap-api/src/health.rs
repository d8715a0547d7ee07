//! Health check endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" once the server is up.
    pub status: String,
    /// Module name.
    pub module: String,
    /// Crate version.
    pub version: String,
    /// Records in the index.
    pub records: usize,
    /// (year, place) partitions in the index.
    pub partitions: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "rentmap-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.index.record_count(),
        partitions: state.index.partition_count(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
