//! # rentmap-api
//!
//! Read-only JSON API over a built [`StratifiedIndex`].
//!
//! The index is shared behind an `Arc` and never mutated, so handlers run
//! concurrently without locks.

pub mod error;
pub mod health;
pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use rentmap_index::StratifiedIndex;
use rentmap_ingest::PlaceDirectory;

pub use error::{ApiError, Result};
pub use routes::PlaceSummary;
pub use server::serve;

/// Application state shared across HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// The immutable index
    pub index: Arc<StratifiedIndex>,
    /// FIPS codes for the place listing (may be empty)
    pub directory: Arc<PlaceDirectory>,
}

impl AppState {
    /// Create state with an empty place directory
    pub fn new(index: Arc<StratifiedIndex>) -> Self {
        Self {
            index,
            directory: Arc::new(PlaceDirectory::default()),
        }
    }

    /// Attach a place directory
    pub fn with_directory(mut self, directory: PlaceDirectory) -> Self {
        self.directory = Arc::new(directory);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/places", get(routes::list_places))
        .route("/api/places/{place}/years", get(routes::place_years))
        .route("/api/places/{place}/years/{year}/records", get(routes::records))
        .route("/api/places/{place}/years/{year}/tracts", get(routes::tracts))
        .route("/api/places/{place}/years/{year}/map", get(routes::map))
        .route(
            "/api/places/{place}/years/{year}/map/{tract}",
            get(routes::map_with_tract),
        )
        .route("/api/places/{place}/years/{year}/geometry", get(routes::geometry))
        .route("/api/places/{place}/tracts/{tract}/series", get(routes::series));

    Router::new()
        .merge(api)
        .merge(health::health_routes())
        .with_state(state)
}
