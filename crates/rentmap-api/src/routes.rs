//! Query endpoints.
//!
//! Every handler reads the shared index; nothing here mutates state.

use axum::Json;
use axum::extract::{Path, State};
use rentmap_core::{Record, Year};
use rentmap_index::{MapView, StratifiedIndex, TrendView};
use rentmap_ingest::PlaceDirectory;
use serde::Serialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::{ApiError, Result};

// ============================================================================
// Response types
// ============================================================================

/// A place and the years it can be shown for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceSummary {
    /// Place name.
    pub place: String,
    /// FIPS code, when the place directory knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fips: Option<String>,
    /// Available years, ascending.
    pub years: Vec<Year>,
    /// Year to preselect.
    pub default_year: Option<Year>,
}

impl PlaceSummary {
    /// Summary for one place, or `None` if the index has no data for it.
    pub fn for_place(
        index: &StratifiedIndex,
        directory: &PlaceDirectory,
        place: &str,
    ) -> Option<Self> {
        let years = index.available_years(place);
        if years.is_empty() {
            return None;
        }
        Some(Self {
            place: place.to_string(),
            fips: directory.fips(place).map(str::to_string),
            default_year: years.last().copied(),
            years,
        })
    }

    /// Summaries for every place, sorted by name.
    pub fn collect(index: &StratifiedIndex, directory: &PlaceDirectory) -> Vec<Self> {
        index
            .available_places()
            .into_iter()
            .filter_map(|place| Self::for_place(index, directory, place))
            .collect()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/places
pub async fn list_places(State(state): State<AppState>) -> Json<Vec<PlaceSummary>> {
    Json(PlaceSummary::collect(&state.index, &state.directory))
}

/// GET /api/places/{place}/years
pub async fn place_years(
    State(state): State<AppState>,
    Path(place): Path<String>,
) -> Result<Json<PlaceSummary>> {
    PlaceSummary::for_place(&state.index, &state.directory, &place)
        .map(Json)
        .ok_or(ApiError::UnknownPlace(place))
}

/// GET /api/places/{place}/years/{year}/records
pub async fn records(
    State(state): State<AppState>,
    Path((place, year)): Path<(String, Year)>,
) -> Result<Json<Vec<Record>>> {
    let records = state.index.lookup(year, &place)?;
    tracing::debug!("{place} {year}: {} records", records.len());
    Ok(Json(records.to_vec()))
}

/// GET /api/places/{place}/years/{year}/tracts
pub async fn tracts(
    State(state): State<AppState>,
    Path((place, year)): Path<(String, Year)>,
) -> Result<Json<Vec<String>>> {
    let options = state.index.tract_options(year, &place)?;
    Ok(Json(options.into_iter().map(str::to_string).collect()))
}

/// GET /api/places/{place}/years/{year}/map
pub async fn map(
    State(state): State<AppState>,
    Path((place, year)): Path<(String, Year)>,
) -> Result<Json<MapView>> {
    Ok(Json(MapView::build(&state.index, year, &place, None)?))
}

/// GET /api/places/{place}/years/{year}/map/{tract}
pub async fn map_with_tract(
    State(state): State<AppState>,
    Path((place, year, tract)): Path<(String, Year, String)>,
) -> Result<Json<MapView>> {
    Ok(Json(MapView::build(&state.index, year, &place, Some(&tract))?))
}

/// GET /api/places/{place}/years/{year}/geometry
pub async fn geometry(
    State(state): State<AppState>,
    Path((place, year)): Path<(String, Year)>,
) -> Result<Json<Value>> {
    let features: Vec<Value> = state
        .index
        .features(year, &place)?
        .iter()
        .map(|feature| feature.to_geojson())
        .collect();

    Ok(Json(json!({
        "type": "FeatureCollection",
        "features": features,
    })))
}

/// GET /api/places/{place}/tracts/{tract}/series
///
/// An unknown tract returns an empty trend, not an error.
pub async fn series(
    State(state): State<AppState>,
    Path((place, tract)): Path<(String, String)>,
) -> Json<TrendView> {
    Json(TrendView::build(&state.index, &place, &tract))
}
