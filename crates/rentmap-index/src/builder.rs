//! IndexBuilder for partitioning a loaded dataset by place and year.
//!
//! The build runs in two phases:
//!
//! 1. Group every year's records by place, in source order, applying the
//!    [`DuplicatePolicy`] to repeated tract names.
//! 2. Attach geometry features to the partitions created in phase 1. A
//!    feature that names its place goes to that place; a feature without a
//!    place goes to every partition whose records reference its `GEO_ID`.
//!    Features that match no partition are counted as orphaned.
//!
//! Because features only attach to partitions that already hold records,
//! the record and geometry sides of the index always share one key set.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use rentmap_core::{Error, GeoFeature, Record, Result, Year};
use rentmap_ingest::Dataset;
use serde::{Deserialize, Serialize};

use crate::index::StratifiedIndex;

// ============================================================================
// Builder configuration types
// ============================================================================

/// What to do when a (year, place) repeats a tract name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the build with `DuplicateTract`.
    #[default]
    Reject,
    /// Keep the first record in source order and drop later ones.
    KeepFirst,
}

/// Statistics from an index build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Records placed into partitions.
    pub records_indexed: usize,
    /// Number of (year, place) partitions.
    pub partitions: usize,
    /// Feature placements (a shared feature counts once per partition).
    pub features_indexed: usize,
    /// Features whose place or `GEO_ID` matched no partition.
    pub orphaned_features: usize,
    /// Duplicate tracts dropped under [`DuplicatePolicy::KeepFirst`].
    pub duplicates_dropped: usize,
    /// Indexed records without a centroid.
    pub unlocated_records: usize,
}

// ============================================================================
// IndexBuilder
// ============================================================================

/// Builder for [`StratifiedIndex`].
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    duplicate_policy: DuplicatePolicy,
}

impl IndexBuilder {
    /// Create a builder that rejects duplicate tracts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate tract policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Build the index from a loaded dataset.
    ///
    /// # Errors
    ///
    /// `DuplicateTract` if a (year, place) repeats a tract name and the
    /// policy is [`DuplicatePolicy::Reject`].
    pub fn build(self, dataset: Dataset) -> Result<(StratifiedIndex, BuildStats)> {
        let Dataset { tables, geometry } = dataset;
        let mut index = StratifiedIndex::default();
        let mut stats = BuildStats::default();

        // Phase 1: records
        for (year, rows) in tables {
            for record in rows {
                self.add_record(&mut index, &mut stats, year, record)?;
            }
        }

        // Phase 2: geometry
        for (year, features) in geometry {
            attach_features(&mut index, &mut stats, year, features);
        }

        stats.partitions = index.partition_count();

        log::info!(
            "Indexed {} records into {} partitions ({} feature placements)",
            stats.records_indexed,
            stats.partitions,
            stats.features_indexed
        );
        if stats.orphaned_features > 0 {
            log::warn!(
                "{} geometry features matched no place with data",
                stats.orphaned_features
            );
        }
        if stats.unlocated_records > 0 {
            log::debug!("{} records have no centroid", stats.unlocated_records);
        }

        Ok((index, stats))
    }

    fn add_record(
        &self,
        index: &mut StratifiedIndex,
        stats: &mut BuildStats,
        year: Year,
        record: Record,
    ) -> Result<()> {
        let partition = index.partition_mut(year, &record.place);

        if partition.contains_tract(&record.tract_name) {
            match self.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(Error::duplicate_tract(
                        year,
                        record.place,
                        record.tract_name,
                    ));
                }
                DuplicatePolicy::KeepFirst => {
                    log::warn!(
                        "{year}: dropping duplicate {} in {}",
                        record.tract_name,
                        record.place
                    );
                    stats.duplicates_dropped += 1;
                    return Ok(());
                }
            }
        }

        if record.centroid.is_none() {
            stats.unlocated_records += 1;
        }
        partition.push_record(record);
        stats.records_indexed += 1;
        Ok(())
    }
}

fn attach_features(
    index: &mut StratifiedIndex,
    stats: &mut BuildStats,
    year: Year,
    features: Vec<GeoFeature>,
) {
    // GEO_ID -> places whose records reference it this year
    let mut referenced: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (place, partition) in index.places_in_year(year) {
        for record in partition.records() {
            referenced
                .entry(record.geo_id.clone())
                .or_default()
                .insert(place.to_string());
        }
    }

    for feature in features {
        let targets: Vec<String> = match feature.place {
            Some(ref place) if index.contains(year, place) => vec![place.clone()],
            Some(_) => Vec::new(),
            None => referenced
                .get(&feature.geo_id)
                .map(|places| places.iter().cloned().collect())
                .unwrap_or_default(),
        };

        if targets.is_empty() {
            log::debug!("{year}: feature {} has no partition", feature.geo_id);
            stats.orphaned_features += 1;
            continue;
        }

        let feature = Arc::new(feature);
        for place in targets {
            if let Some(partition) = index.existing_partition_mut(year, &place) {
                partition.push_feature(Arc::clone(&feature));
                stats.features_indexed += 1;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
