//! FIPS code to place name directory (`PLACE_FIPS`, `PLACENAME`).

use std::collections::BTreeMap;

use rentmap_core::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    #[serde(rename = "PLACE_FIPS")]
    fips: String,
    #[serde(rename = "PLACENAME")]
    name: String,
}

/// Place names keyed by FIPS code.
///
/// Codes are kept as strings so leading zeros survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceDirectory {
    names: BTreeMap<String, String>,
}

impl PlaceDirectory {
    /// Parse a directory CSV. `location` is only used in error messages.
    pub fn parse(text: &str, location: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut names = BTreeMap::new();
        for row in reader.deserialize::<DirectoryRow>() {
            let row = row.map_err(|e| {
                Error::schema_at(location, e.position().map(|p| p.line()), e.to_string())
            })?;
            if row.fips.is_empty() || row.name.is_empty() {
                return Err(Error::schema(location, "empty PLACE_FIPS or PLACENAME"));
            }
            names.insert(row.fips, row.name);
        }

        Ok(Self { names })
    }

    /// Place name for a FIPS code.
    pub fn name(&self, fips: &str) -> Option<&str> {
        self.names.get(fips).map(String::as_str)
    }

    /// FIPS code for a place name.
    pub fn fips(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(code, _)| code.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when the directory has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
