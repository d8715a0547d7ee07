//! Yearly ACS contract rent tables.
//!
//! One CSV per year, one row per (place, tract). Required columns:
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `YEAR` | Survey year, must match the file's year |
//! | `PLACE` | Place name |
//! | `GEO_ID` | Join key to the geometry layer |
//! | `NAME` | Tract name |
//! | `B25058_001E` | Median contract rent |
//! | `B25057_001E` | Lower quartile contract rent |
//! | `B25059_001E` | Upper quartile contract rent |
//!
//! An optional `TRACT` column overrides the tract id derived from `GEO_ID`.
//! Any problem rejects the whole file.

use rentmap_core::{Error, Record, Result, Year};
use serde::Deserialize;

/// Columns every tabular file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "YEAR",
    "PLACE",
    "GEO_ID",
    "NAME",
    MEDIAN_COLUMN,
    P25_COLUMN,
    P75_COLUMN,
];

/// Median contract rent estimate.
pub const MEDIAN_COLUMN: &str = "B25058_001E";
/// Lower quartile contract rent estimate.
pub const P25_COLUMN: &str = "B25057_001E";
/// Upper quartile contract rent estimate.
pub const P75_COLUMN: &str = "B25059_001E";

#[derive(Debug, Deserialize)]
struct TabularRow {
    #[serde(rename = "YEAR")]
    year: String,
    #[serde(rename = "PLACE")]
    place: String,
    #[serde(rename = "GEO_ID")]
    geo_id: String,
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "TRACT", default)]
    tract: Option<String>,
    #[serde(rename = "B25058_001E", default)]
    median: Option<String>,
    #[serde(rename = "B25057_001E", default)]
    p25: Option<String>,
    #[serde(rename = "B25059_001E", default)]
    p75: Option<String>,
}

/// Parse one year's table into records, in file order.
///
/// `location` is only used in error messages.
pub fn parse_tabular(text: &str, year: Year, location: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::schema(location, format!("unreadable header: {e}")))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(Error::schema(
            location,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut records = Vec::new();
    for raw in reader.records() {
        let raw = raw.map_err(|e| {
            let line = e.position().map(|p| p.line());
            Error::schema_at(location, line, e.to_string())
        })?;
        let line = raw.position().map(|p| p.line());
        let row: TabularRow = raw
            .deserialize(Some(&headers))
            .map_err(|e| Error::schema_at(location, line, e.to_string()))?;
        records.push(to_record(row, year, location, line)?);
    }

    Ok(records)
}

fn to_record(row: TabularRow, year: Year, location: &str, line: Option<u64>) -> Result<Record> {
    let row_year: Year = row
        .year
        .parse()
        .map_err(|_| Error::schema_at(location, line, format!("YEAR '{}' is not a year", row.year)))?;
    if row_year != year {
        return Err(Error::schema_at(
            location,
            line,
            format!("YEAR {row_year} does not match file year {year}"),
        ));
    }

    for (column, value) in [("PLACE", &row.place), ("GEO_ID", &row.geo_id), ("NAME", &row.name)] {
        if value.is_empty() {
            return Err(Error::schema_at(location, line, format!("{column} is empty")));
        }
    }

    let estimate = |column: &str, cell: &Option<String>| {
        parse_estimate(cell.as_deref())
            .map_err(|message| Error::schema_at(location, line, format!("{column}: {message}")))
    };
    let median = estimate(MEDIAN_COLUMN, &row.median)?;
    let p25 = estimate(P25_COLUMN, &row.p25)?;
    let p75 = estimate(P75_COLUMN, &row.p75)?;

    let mut record = Record::new(year, row.place, row.name, row.geo_id).with_estimates(median, p25, p75);
    if let Some(tract) = row.tract.filter(|t| !t.is_empty()) {
        record = record.with_tract_id(tract);
    }

    Ok(record)
}

/// Parse an estimate cell. Blank and NaN-like cells are unmeasured.
pub fn parse_estimate(cell: Option<&str>) -> std::result::Result<Option<f64>, String> {
    let Some(cell) = cell.map(str::trim) else {
        return Ok(None);
    };

    if cell.is_empty()
        || ["nan", "na", "null", "none"]
            .iter()
            .any(|marker| cell.eq_ignore_ascii_case(marker))
    {
        return Ok(None);
    }

    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!("'{cell}' is not a number")),
    }
}

// ============================================================================
// Tests
// ============================================================================
