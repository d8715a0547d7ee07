//! Startup loading of every year in range.
//!
//! For each year the loader fetches the tabular and geometry sources,
//! parses both, and left-joins the rows to the geometry on `GEO_ID` to pull
//! in centroids. Rows without geometry are kept with no centroid. Years are
//! loaded concurrently and the first failure aborts the whole load, so a
//! partially loaded dataset never reaches the index builder.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rentmap_core::{Centroid, Error, GeoFeature, Record, Result, SourceKind, Year, YearRange};

use crate::geometry::parse_geometry;
use crate::places::PlaceDirectory;
use crate::source::{DataSource, SourceLayout};
use crate::tabular::parse_tabular;

/// Per-year tables and geometry, as loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Joined rows, in file order.
    pub tables: BTreeMap<Year, Vec<Record>>,
    /// Geometry features, in file order.
    pub geometry: BTreeMap<Year, Vec<GeoFeature>>,
}

impl Dataset {
    /// Add one year's rows and features.
    pub fn insert_year(&mut self, year: Year, rows: Vec<Record>, features: Vec<GeoFeature>) {
        self.tables.insert(year, rows);
        self.geometry.insert(year, features);
    }

    /// Years with a table, ascending.
    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.tables.keys().copied()
    }

    /// Rows loaded for `year`.
    pub fn row_count(&self, year: Year) -> usize {
        self.tables.get(&year).map_or(0, Vec::len)
    }

    /// Rows across all years.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Features across all years.
    pub fn total_features(&self) -> usize {
        self.geometry.values().map(Vec::len).sum()
    }
}

/// Loads yearly inputs from a [`DataSource`].
pub struct DatasetLoader {
    source: Arc<dyn DataSource>,
    layout: SourceLayout,
}

impl DatasetLoader {
    /// Create a loader with the default file layout.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            layout: SourceLayout::default(),
        }
    }

    /// Set the file layout.
    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Load every year in `range`.
    ///
    /// # Errors
    ///
    /// - `MissingSource` if a year's table or geometry is absent
    /// - `Schema` if any file is malformed
    /// - `Source`/`Io` if a source cannot be read
    pub async fn load(&self, range: YearRange) -> Result<Dataset> {
        range.validate()?;
        log::info!("Loading contract rent data for {range}");

        let years = futures::future::try_join_all(range.iter().map(|year| self.load_year(year))).await?;

        let mut dataset = Dataset::default();
        for (year, rows, features) in years {
            dataset.insert_year(year, rows, features);
        }

        log::info!(
            "Loaded {} rows and {} features across {} years",
            dataset.total_rows(),
            dataset.total_features(),
            dataset.tables.len()
        );
        Ok(dataset)
    }

    /// Load the optional FIPS directory through the same source.
    pub async fn load_place_directory(&self, location: &str) -> Result<PlaceDirectory> {
        let described = self.source.describe(location);
        let text = self
            .source
            .read(location)
            .await?
            .ok_or_else(|| Error::missing_unscoped_source(SourceKind::PlaceDirectory, &described))?;
        let directory = PlaceDirectory::parse(&text, &described)?;
        log::debug!("Loaded {} place directory entries", directory.len());
        Ok(directory)
    }

    async fn load_year(&self, year: Year) -> Result<(Year, Vec<Record>, Vec<GeoFeature>)> {
        let tabular_location = self.layout.tabular(year);
        let geometry_location = self.layout.geometry(year);

        let (tabular, geometry) = futures::try_join!(
            self.fetch(SourceKind::Tabular, year, &tabular_location),
            self.fetch(SourceKind::Geometry, year, &geometry_location),
        )?;

        let mut rows = parse_tabular(&tabular, year, &self.source.describe(&tabular_location))?;
        let features = parse_geometry(&geometry, &self.source.describe(&geometry_location))?;

        let unmatched = join_centroids(&mut rows, &features);
        if unmatched > 0 {
            log::warn!("{year}: {unmatched} of {} rows have no matching geometry", rows.len());
        }
        log::debug!("{year}: {} rows, {} features", rows.len(), features.len());

        Ok((year, rows, features))
    }

    async fn fetch(&self, kind: SourceKind, year: Year, location: &str) -> Result<String> {
        self.source
            .read(location)
            .await?
            .ok_or_else(|| Error::missing_source(kind, year, self.source.describe(location)))
    }
}

impl std::fmt::Debug for DatasetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetLoader")
            .field("layout", &self.layout)
            .finish()
    }
}

/// Left-join rows to features on `geo_id`, copying centroids.
///
/// When a `GEO_ID` repeats in the geometry, the first feature wins. Returns
/// the number of rows with no matching feature; those rows are left as-is.
pub fn join_centroids(rows: &mut [Record], features: &[GeoFeature]) -> usize {
    let mut centroids: HashMap<&str, Option<Centroid>> = HashMap::with_capacity(features.len());
    for feature in features {
        centroids
            .entry(feature.geo_id.as_str())
            .or_insert(feature.centroid);
    }

    let mut unmatched = 0;
    for row in rows.iter_mut() {
        match centroids.get(row.geo_id.as_str()) {
            Some(centroid) => row.centroid = *centroid,
            None => unmatched += 1,
        }
    }
    unmatched
}

// ============================================================================
// Tests
// ============================================================================
