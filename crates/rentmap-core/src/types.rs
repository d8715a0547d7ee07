//! Data model shared by the loader, the index, and the query layer.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sanitize::sanitize;

/// Survey year of an ACS snapshot.
pub type Year = u16;

// ============================================================================
// YearRange
// ============================================================================

/// Contiguous, inclusive range of survey years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    /// First year (inclusive).
    pub start: Year,
    /// Last year (inclusive).
    pub end: Year,
}

impl YearRange {
    /// First year with published contract rent snapshots.
    pub const FIRST: Year = 2010;
    /// Latest year with published contract rent snapshots.
    pub const LAST: Year = 2023;

    /// Create a range, rejecting `start > end`.
    pub fn new(start: Year, end: Year) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Check that the range is not inverted.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::config(format!(
                "year range start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Iterate the years in ascending order.
    pub fn iter(&self) -> RangeInclusive<Year> {
        self.start..=self.end
    }

    /// Returns `true` if `year` falls inside the range.
    pub fn contains(&self, year: Year) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// Number of years in the range.
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            usize::from(self.end - self.start) + 1
        }
    }

    /// Returns `true` for an inverted (empty) range.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            start: Self::FIRST,
            end: Self::LAST,
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ============================================================================
// SourceKind
// ============================================================================

/// Kind of input source read at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Yearly CSV of ACS estimates.
    Tabular,
    /// Yearly GeoJSON of tract boundaries.
    Geometry,
    /// FIPS code to place name table.
    PlaceDirectory,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tabular => write!(f, "tabular"),
            Self::Geometry => write!(f, "geometry"),
            Self::PlaceDirectory => write!(f, "place directory"),
        }
    }
}

// ============================================================================
// Centroid / DisplayValues
// ============================================================================

/// Internal point of a tract (`INTPTLAT`, `INTPTLON`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Centroid {
    /// Create a centroid.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Hover-text strings for the three rent estimates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayValues {
    /// Median contract rent.
    pub median: String,
    /// 25th percentile contract rent.
    pub p25: String,
    /// 75th percentile contract rent.
    pub p75: String,
}

impl DisplayValues {
    /// Sanitize the three raw estimates for `year`.
    pub fn from_raw(median: Option<f64>, p25: Option<f64>, p75: Option<f64>, year: Year) -> Self {
        Self {
            median: sanitize(median, year),
            p25: sanitize(p25, year),
            p75: sanitize(p75, year),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// One census tract in one place for one year.
///
/// Raw estimates are kept as loaded for the map's colour scale; `display`
/// holds the sanitized strings and is computed once, when the estimates are
/// set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Survey year.
    pub year: Year,
    /// Place (city or CDP) name.
    pub place: String,
    /// Tract identifier, unique within place and year.
    pub tract_id: String,
    /// Human-readable tract name, e.g. "Census Tract 5701".
    pub tract_name: String,
    /// Geographic identifier shared with the geometry layer.
    pub geo_id: String,
    /// Median contract rent (B25058_001E).
    pub median_value: Option<f64>,
    /// 25th percentile contract rent (B25057_001E).
    pub p25_value: Option<f64>,
    /// 75th percentile contract rent (B25059_001E).
    pub p75_value: Option<f64>,
    /// Tract centroid, when the geometry layer has one.
    pub centroid: Option<Centroid>,
    /// Sanitized display strings.
    pub display: DisplayValues,
}

impl Record {
    /// Create a record with no estimates and no centroid.
    ///
    /// The tract id defaults to the part of `geo_id` after the `US`
    /// summary-level separator.
    pub fn new(
        year: Year,
        place: impl Into<String>,
        tract_name: impl Into<String>,
        geo_id: impl Into<String>,
    ) -> Self {
        let geo_id = geo_id.into();
        Self {
            year,
            place: place.into(),
            tract_id: tract_id_from_geo_id(&geo_id).to_string(),
            tract_name: tract_name.into(),
            geo_id,
            median_value: None,
            p25_value: None,
            p75_value: None,
            centroid: None,
            display: DisplayValues::from_raw(None, None, None, year),
        }
    }

    /// Set the raw estimates and derive their display strings.
    pub fn with_estimates(mut self, median: Option<f64>, p25: Option<f64>, p75: Option<f64>) -> Self {
        self.median_value = median;
        self.p25_value = p25;
        self.p75_value = p75;
        self.display = DisplayValues::from_raw(median, p25, p75, self.year);
        self
    }

    /// Override the tract identifier.
    pub fn with_tract_id(mut self, tract_id: impl Into<String>) -> Self {
        self.tract_id = tract_id.into();
        self
    }

    /// Set the centroid.
    pub fn with_centroid(mut self, centroid: Centroid) -> Self {
        self.centroid = Some(centroid);
        self
    }
}

/// Strip the summary-level prefix from a GEO_ID ("1400000US06037570100" → "06037570100").
pub fn tract_id_from_geo_id(geo_id: &str) -> &str {
    geo_id.split_once("US").map_or(geo_id, |(_, id)| id)
}

// ============================================================================
// GeoFeature
// ============================================================================

/// One tract boundary from a yearly geometry collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    /// Geographic identifier, the join key to [`Record::geo_id`].
    pub geo_id: String,
    /// Place the feature was cut for, if the collection says so.
    pub place: Option<String>,
    /// Internal point of the tract.
    pub centroid: Option<Centroid>,
    /// GeoJSON geometry object, kept verbatim for rendering.
    pub geometry: serde_json::Value,
}

impl GeoFeature {
    /// Create a feature with no place, centroid, or geometry.
    pub fn new(geo_id: impl Into<String>) -> Self {
        Self {
            geo_id: geo_id.into(),
            place: None,
            centroid: None,
            geometry: serde_json::Value::Null,
        }
    }

    /// Set the place.
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Set the centroid.
    pub fn with_centroid(mut self, centroid: Centroid) -> Self {
        self.centroid = Some(centroid);
        self
    }

    /// Set the geometry object.
    pub fn with_geometry(mut self, geometry: serde_json::Value) -> Self {
        self.geometry = geometry;
        self
    }

    /// Render as a GeoJSON `Feature` keyed by `GEO_ID`.
    pub fn to_geojson(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        properties.insert("GEO_ID".into(), self.geo_id.clone().into());
        if let Some(ref place) = self.place {
            properties.insert("PLACE".into(), place.clone().into());
        }
        if let Some(centroid) = self.centroid {
            properties.insert("INTPTLAT".into(), centroid.lat.into());
            properties.insert("INTPTLON".into(), centroid.lon.into());
        }

        serde_json::json!({
            "type": "Feature",
            "properties": properties,
            "geometry": self.geometry,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
