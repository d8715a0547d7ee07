//! Error types for Rentmap.
//!
//! Startup errors (`MissingSource`, `Schema`, `DuplicateTract`) abort index
//! construction. `NotFound` is the only error a query can produce and is
//! meant to be shown to the user as "no data".

use std::path::{Path, PathBuf};

use crate::types::{SourceKind, Year};

/// Result type alias for Rentmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, indexing, or querying rent data.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A year's tabular or geometry source is absent.
    #[error("Missing {kind} source{}: {location}", .year.map(|y| format!(" for {y}")).unwrap_or_default())]
    MissingSource {
        /// Which kind of source is missing
        kind: SourceKind,
        /// Year the source was expected for, if year-scoped
        year: Option<Year>,
        /// Where the source was looked up
        location: String,
    },

    /// A source file is malformed; the whole file is rejected.
    #[error("Schema error in {location}{}: {message}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Schema {
        /// File or URL that failed validation
        location: String,
        /// Line number, when known
        line: Option<u64>,
        /// What went wrong
        message: String,
    },

    /// No partition exists for the requested (year, place) pair.
    #[error("No data for {place} in {year}")]
    NotFound {
        /// Requested year
        year: Year,
        /// Requested place
        place: String,
    },

    /// More than one record shares (year, place, tract name).
    #[error("Duplicate tract '{tract_name}' for {place} in {year}")]
    DuplicateTract {
        /// Year of the duplicated records
        year: Year,
        /// Place of the duplicated records
        place: String,
        /// Tract name that appeared more than once
        tract_name: String,
    },

    /// A source could not be read (network failure, bad status, ...).
    #[error("Failed to read {location}: {message}")]
    Source {
        /// File or URL being read
        location: String,
        /// Transport-level message
        message: String,
    },

    /// I/O error tied to a filesystem path.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for [`Error::NotFound`], the one error a caller can
    /// recover from by showing "no data".
    ///
    /// Everything else indicates bad input files or a broken deployment and
    /// should stop startup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Creates a missing-source error for a year-scoped source.
    pub fn missing_source(kind: SourceKind, year: Year, location: impl Into<String>) -> Self {
        Error::MissingSource {
            kind,
            year: Some(year),
            location: location.into(),
        }
    }

    /// Creates a missing-source error for a source that is not year-scoped.
    pub fn missing_unscoped_source(kind: SourceKind, location: impl Into<String>) -> Self {
        Error::MissingSource {
            kind,
            year: None,
            location: location.into(),
        }
    }

    /// Creates a schema error without line information.
    pub fn schema(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            location: location.into(),
            line: None,
            message: message.into(),
        }
    }

    /// Creates a schema error pinned to a line.
    pub fn schema_at(location: impl Into<String>, line: Option<u64>, message: impl Into<String>) -> Self {
        Error::Schema {
            location: location.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(year: Year, place: impl Into<String>) -> Self {
        Error::NotFound {
            year,
            place: place.into(),
        }
    }

    /// Creates a duplicate-tract error.
    pub fn duplicate_tract(year: Year, place: impl Into<String>, tract_name: impl Into<String>) -> Self {
        Error::DuplicateTract {
            year,
            place: place.into(),
            tract_name: tract_name.into(),
        }
    }

    /// Creates a source transport error.
    pub fn source(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Source {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that produced it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_display() {
        let err = Error::missing_source(SourceKind::Geometry, 2015, "assets/geo_2015.json");
        assert_eq!(
            err.to_string(),
            "Missing geometry source for 2015: assets/geo_2015.json"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_missing_unscoped_source_display() {
        let err = Error::missing_unscoped_source(SourceKind::PlaceDirectory, "fips.csv");
        assert_eq!(err.to_string(), "Missing place directory source: fips.csv");
    }

    #[test]
    fn test_schema_display_with_line() {
        let err = Error::schema_at("rent_2012.csv", Some(7), "YEAR is not a number");
        assert_eq!(
            err.to_string(),
            "Schema error in rent_2012.csv (line 7): YEAR is not a number"
        );
    }

    #[test]
    fn test_schema_display_without_line() {
        let err = Error::schema("rent_2012.csv", "missing column PLACE");
        assert_eq!(
            err.to_string(),
            "Schema error in rent_2012.csv: missing column PLACE"
        );
    }

    #[test]
    fn test_not_found_classification() {
        let err = Error::not_found(2019, "Long Beach");
        assert_eq!(err.to_string(), "No data for Long Beach in 2019");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_tract_display() {
        let err = Error::duplicate_tract(2020, "Pasadena", "Census Tract 4601");
        assert_eq!(
            err.to_string(),
            "Duplicate tract 'Census Tract 4601' for Pasadena in 2020"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(io, "/data/rent.csv");
        assert!(err.to_string().contains("/data/rent.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
