//! View models handed to map and chart renderers.
//!
//! These carry everything a renderer needs (framing, colour scale bounds,
//! hover strings, axis ranges) so that rendering code never reaches back
//! into the index.

use rentmap_core::{Centroid, DisplayValues, Record, Result, Year};
use serde::Serialize;

use crate::index::StratifiedIndex;
use crate::query::tract_series;

/// Initial zoom level for a place map.
pub const MAP_ZOOM: f64 = 10.5;

/// Upper bound of the median rent colour scale, in dollars.
pub const COLOR_SCALE_MAX: f64 = 3500.0;

/// Chart heading shown before any tract is selected.
pub const NO_TRACT_HEADING: &str = "Please click on a tract.";

// ============================================================================
// Map
// ============================================================================

/// Numeric bounds of the choropleth colour scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: COLOR_SCALE_MAX,
        }
    }
}

/// One tract on the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapTract {
    /// Join key to the rendered geometry.
    pub geo_id: String,
    /// Tract name for the hover label.
    pub tract_name: String,
    /// Raw median used for the colour scale.
    pub median_value: Option<f64>,
    /// Hover strings.
    pub display: DisplayValues,
}

impl From<&Record> for MapTract {
    fn from(record: &Record) -> Self {
        Self {
            geo_id: record.geo_id.clone(),
            tract_name: record.tract_name.clone(),
            median_value: record.median_value,
            display: record.display.clone(),
        }
    }
}

/// Choropleth of one place in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Place shown.
    pub place: String,
    /// Survey year shown.
    pub year: Year,
    /// Initial map centre; `None` when no tract has a centroid.
    pub center: Option<Centroid>,
    /// Initial zoom.
    pub zoom: f64,
    /// Colour scale bounds.
    pub color_scale: ColorScale,
    /// Tracts in source order.
    pub tracts: Vec<MapTract>,
    /// `GEO_ID` of the outlined tract, if one was requested and exists.
    pub highlighted: Option<String>,
}

impl MapView {
    /// Build the map for (year, place), optionally outlining one tract.
    ///
    /// # Errors
    ///
    /// `NotFound` if the place has no data for that year.
    pub fn build(
        index: &StratifiedIndex,
        year: Year,
        place: &str,
        highlight: Option<&str>,
    ) -> Result<Self> {
        let partition = index.partition(year, place)?;
        let records = partition.records();

        let highlighted = highlight
            .and_then(|name| partition.record(name))
            .map(|record| record.geo_id.clone());

        Ok(Self {
            place: place.to_string(),
            year,
            center: map_center(records),
            zoom: MAP_ZOOM,
            color_scale: ColorScale::default(),
            tracts: records.iter().map(MapTract::from).collect(),
            highlighted,
        })
    }
}

/// Mean centroid of the located records, rounded to 5 decimals.
pub fn map_center(records: &[Record]) -> Option<Centroid> {
    let located: Vec<Centroid> = records.iter().filter_map(|r| r.centroid).collect();
    if located.is_empty() {
        return None;
    }

    let n = located.len() as f64;
    let lat = located.iter().map(|c| c.lat).sum::<f64>() / n;
    let lon = located.iter().map(|c| c.lon).sum::<f64>() / n;
    Some(Centroid::new(round5(lat), round5(lon)))
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

// ============================================================================
// Trend chart
// ============================================================================

/// One point of a tract's trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Survey year (x).
    pub year: Year,
    /// Raw median (y); gaps when not measured.
    pub median_value: Option<f64>,
    /// Hover strings.
    pub display: DisplayValues,
}

/// Inclusive x-axis bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// Line chart of one tract across years.
///
/// An empty `points` list means there is nothing to display; title and
/// axis are then `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    /// Chart heading, "{place}, {tract}".
    pub heading: String,
    /// "Median Contract Rents, {first} to {last}".
    pub title: Option<String>,
    /// Padded x-axis range.
    pub x_range: Option<AxisRange>,
    /// One tick per year from first to last.
    pub tick_years: Vec<Year>,
    /// Points in ascending year order.
    pub points: Vec<TrendPoint>,
}

impl TrendView {
    /// Build the trend chart for one tract of a place.
    pub fn build(index: &StratifiedIndex, place: &str, tract_name: &str) -> Self {
        let points: Vec<TrendPoint> = tract_series(index, place, tract_name)
            .into_iter()
            .map(|record| TrendPoint {
                year: record.year,
                median_value: record.median_value,
                display: record.display.clone(),
            })
            .collect();

        let span = points.first().zip(points.last()).map(|(a, b)| (a.year, b.year));

        Self {
            heading: plot_heading(place, Some(tract_name)),
            title: span.map(|(first, last)| format!("Median Contract Rents, {first} to {last}")),
            x_range: span.map(|(first, last)| AxisRange {
                min: f64::from(first) - 0.5,
                max: f64::from(last) + 0.5,
            }),
            tick_years: span.map(|(first, last)| (first..=last).collect()).unwrap_or_default(),
            points,
        }
    }

    /// Returns `true` when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Heading above the trend chart.
pub fn plot_heading(place: &str, tract_name: Option<&str>) -> String {
    match tract_name {
        Some(tract) => format!("{place}, {tract}"),
        None => NO_TRACT_HEADING.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
