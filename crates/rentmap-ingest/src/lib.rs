//! Dataset loading for Rentmap.
//!
//! Reads the yearly contract rent tables and tract geometry collections,
//! left-joins each table to its geometry on `GEO_ID`, and hands the result
//! to the index builder.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      rentmap-ingest                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DataSource trait                                           │
//! │  ├── FsSource (local directory)                             │
//! │  └── HttpSource (remote base URL)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  parse_tabular  (ACS CSV → Record)                          │
//! │  parse_geometry (GeoJSON FeatureCollection → GeoFeature)    │
//! │  PlaceDirectory (FIPS → place name)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DatasetLoader (per-year fetch, parse, centroid join)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rentmap_ingest::{DatasetLoader, open_source};
//!
//! let loader = DatasetLoader::new(open_source("./data"));
//! let dataset = loader.load(YearRange::default()).await?;
//! println!("{} rows", dataset.total_rows());
//! ```

pub mod geometry;
pub mod loader;
pub mod places;
pub mod source;
pub mod tabular;

pub use geometry::parse_geometry;
pub use loader::{Dataset, DatasetLoader, join_centroids};
pub use places::PlaceDirectory;
pub use source::{DataSource, FsSource, HttpSource, SourceLayout, open_source};
pub use tabular::parse_tabular;
