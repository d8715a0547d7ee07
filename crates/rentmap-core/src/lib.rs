//! Rentmap Core: shared types, the value sanitizer, and errors.
//!
//! This crate has no internal Rentmap dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`sanitize`]: Top-coding rules that turn raw ACS estimates into display strings
//! - [`types`]: Records, geometry features, and year ranges

pub mod error;
pub mod sanitize;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use sanitize::{NOT_AVAILABLE, TopCode, caps_for, sanitize};
pub use types::{Centroid, DisplayValues, GeoFeature, Record, SourceKind, Year, YearRange};
