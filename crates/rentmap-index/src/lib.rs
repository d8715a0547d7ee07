//! Stratified index and query layer for Rentmap.
//!
//! The index is built once from a loaded [`Dataset`](rentmap_ingest::Dataset)
//! and is immutable afterwards, so it can be shared behind an `Arc` by any
//! number of concurrent readers without locking.
//!
//! # Modules
//!
//! - [`builder`]: Partitioning a dataset by place and year
//! - [`index`]: The immutable [`StratifiedIndex`] and its lookups
//! - [`query`]: Tract time series across years
//! - [`view`]: Map and trend view models for renderers

pub mod builder;
pub mod index;
pub mod query;
pub mod view;

pub use builder::{BuildStats, DuplicatePolicy, IndexBuilder};
pub use index::{Partition, StratifiedIndex};
pub use query::tract_series;
pub use view::{
    AxisRange, COLOR_SCALE_MAX, ColorScale, MAP_ZOOM, MapTract, MapView, NO_TRACT_HEADING, TrendPoint,
    TrendView, map_center, plot_heading,
};
