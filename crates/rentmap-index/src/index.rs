//! The immutable year/place index.
//!
//! Storage is place-first (`place → year → Partition`). Each partition owns
//! both the records and the geometry features for its (year, place), so the
//! two sides always share the same key set, and a place's available years
//! are simply the keys of its inner map.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use rentmap_core::{Error, GeoFeature, Record, Result, Year};

// ============================================================================
// Partition
// ============================================================================

/// Records and features for one (year, place).
#[derive(Debug, Default)]
pub struct Partition {
    records: Vec<Record>,
    features: Vec<Arc<GeoFeature>>,
    by_tract: HashMap<String, usize>,
}

impl Partition {
    /// Records in source order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Geometry features for this partition.
    pub fn features(&self) -> &[Arc<GeoFeature>] {
        &self.features
    }

    /// Record for a tract name.
    pub fn record(&self, tract_name: &str) -> Option<&Record> {
        self.by_tract.get(tract_name).map(|&i| &self.records[i])
    }

    /// Returns `true` if a record with this tract name is present.
    pub fn contains_tract(&self, tract_name: &str) -> bool {
        self.by_tract.contains_key(tract_name)
    }

    /// Append a record. The caller checks for duplicates first.
    pub(crate) fn push_record(&mut self, record: Record) {
        self.by_tract
            .insert(record.tract_name.clone(), self.records.len());
        self.records.push(record);
    }

    pub(crate) fn push_feature(&mut self, feature: Arc<GeoFeature>) {
        self.features.push(feature);
    }
}

// ============================================================================
// StratifiedIndex
// ============================================================================

/// Contract rent records grouped by place and year.
///
/// Built by [`IndexBuilder`](crate::IndexBuilder); read-only afterwards.
#[derive(Debug, Default)]
pub struct StratifiedIndex {
    places: BTreeMap<String, BTreeMap<Year, Partition>>,
}

impl StratifiedIndex {
    /// Partition for (year, place).
    ///
    /// # Errors
    ///
    /// `NotFound` if the place has no data for that year.
    pub fn partition(&self, year: Year, place: &str) -> Result<&Partition> {
        self.places
            .get(place)
            .and_then(|years| years.get(&year))
            .ok_or_else(|| Error::not_found(year, place))
    }

    /// Records for (year, place), in source order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the pair is absent; check [`available_years`](Self::available_years) first.
    pub fn lookup(&self, year: Year, place: &str) -> Result<&[Record]> {
        self.partition(year, place).map(Partition::records)
    }

    /// Geometry features for (year, place).
    pub fn features(&self, year: Year, place: &str) -> Result<&[Arc<GeoFeature>]> {
        self.partition(year, place).map(Partition::features)
    }

    /// Record for one tract, if the partition and tract exist.
    pub fn record(&self, year: Year, place: &str, tract_name: &str) -> Option<&Record> {
        self.partition(year, place)
            .ok()
            .and_then(|p| p.record(tract_name))
    }

    /// Returns `true` if (year, place) has a partition.
    pub fn contains(&self, year: Year, place: &str) -> bool {
        self.partition(year, place).is_ok()
    }

    /// Years with data for `place`, ascending. Empty for unknown places.
    pub fn available_years(&self, place: &str) -> Vec<Year> {
        self.places
            .get(place)
            .map(|years| years.keys().copied().collect())
            .unwrap_or_default()
    }

    /// All places, sorted.
    pub fn available_places(&self) -> Vec<&str> {
        self.places.keys().map(String::as_str).collect()
    }

    /// Every place with its available years.
    pub fn place_years(&self) -> BTreeMap<&str, Vec<Year>> {
        self.places
            .iter()
            .map(|(place, years)| (place.as_str(), years.keys().copied().collect()))
            .collect()
    }

    /// Year to preselect for a place: the most recent one.
    pub fn default_year(&self, place: &str) -> Option<Year> {
        self.places
            .get(place)
            .and_then(|years| years.keys().next_back().copied())
    }

    /// Tract names with a measured median for (year, place), in source order.
    pub fn tract_options(&self, year: Year, place: &str) -> Result<Vec<&str>> {
        Ok(self
            .lookup(year, place)?
            .iter()
            .filter(|r| r.median_value.is_some())
            .map(|r| r.tract_name.as_str())
            .collect())
    }

    /// All years present for any place.
    pub fn years(&self) -> BTreeSet<Year> {
        self.places
            .values()
            .flat_map(|years| years.keys().copied())
            .collect()
    }

    /// Total records across all partitions.
    pub fn record_count(&self) -> usize {
        self.partitions().map(|p| p.records.len()).sum()
    }

    /// Number of (year, place) partitions.
    pub fn partition_count(&self) -> usize {
        self.places.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if the index holds no partitions.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.places.values().flat_map(BTreeMap::values)
    }

    pub(crate) fn partition_mut(&mut self, year: Year, place: &str) -> &mut Partition {
        self.places
            .entry(place.to_string())
            .or_default()
            .entry(year)
            .or_default()
    }

    pub(crate) fn existing_partition_mut(
        &mut self,
        year: Year,
        place: &str,
    ) -> Option<&mut Partition> {
        self.places
            .get_mut(place)
            .and_then(|years| years.get_mut(&year))
    }

    /// Places with a partition in `year`, with their records.
    pub(crate) fn places_in_year(&self, year: Year) -> impl Iterator<Item = (&str, &Partition)> {
        self.places
            .iter()
            .filter_map(move |(place, years)| years.get(&year).map(|p| (place.as_str(), p)))
    }
}

// ============================================================================
// Tests
// ============================================================================
