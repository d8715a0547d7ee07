//! Where input files come from.
//!
//! A [`DataSource`] resolves a relative location ("masterfiles/rent_2015.csv")
//! to text. Local deployments read from a directory; hosted deployments
//! fetch the same layout from a base URL. Both report an absent file as
//! `Ok(None)` so the loader can turn it into a `MissingSource` error with
//! the year attached.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rentmap_core::{Error, Result, Year};

/// Placeholder substituted with the survey year in layout templates.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Read-only store of input files.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Read a location as UTF-8 text.
    ///
    /// Returns `Ok(None)` when the location does not exist.
    async fn read(&self, location: &str) -> Result<Option<String>>;

    /// Full name of a location, used in errors and logs.
    fn describe(&self, location: &str) -> String;
}

// ============================================================================
// FsSource
// ============================================================================

/// Files under a local directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DataSource for FsSource {
    async fn read(&self, location: &str) -> Result<Option<String>> {
        let path = self.root.join(location);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io_with_path(e, &path)),
        }
    }

    fn describe(&self, location: &str) -> String {
        self.root.join(location).display().to_string()
    }
}

// ============================================================================
// HttpSource
// ============================================================================

/// Files published under a base URL (e.g. a raw GitHub tree).
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// URL for a location.
    pub fn url(&self, location: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            location.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn read(&self, location: &str) -> Result<Option<String>> {
        let url = self.url(location);
        log::debug!("Fetching {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::source(&url, e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| Error::source(&url, e.to_string()))?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::source(&url, e.to_string()))?;

        Ok(Some(text))
    }

    fn describe(&self, location: &str) -> String {
        self.url(location)
    }
}

/// Pick a source for a configured root: URLs go over HTTP, anything else is
/// a local directory.
pub fn open_source(root: &str) -> Arc<dyn DataSource> {
    if root.starts_with("http://") || root.starts_with("https://") {
        Arc::new(HttpSource::new(root))
    } else {
        Arc::new(FsSource::new(root))
    }
}

// ============================================================================
// SourceLayout
// ============================================================================

/// File naming scheme for the yearly inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    tabular_template: String,
    geometry_template: String,
}

impl SourceLayout {
    /// Default tabular template.
    pub const DEFAULT_TABULAR: &'static str = "masterfiles/contract_rent_masterfile_{year}.csv";
    /// Default geometry template.
    pub const DEFAULT_GEOMETRY: &'static str = "assets/contract_rent_mastergeometry_{year}.json";

    /// Create a layout. Both templates must contain `{year}`.
    pub fn new(tabular_template: impl Into<String>, geometry_template: impl Into<String>) -> Result<Self> {
        let tabular_template = tabular_template.into();
        let geometry_template = geometry_template.into();

        for template in [&tabular_template, &geometry_template] {
            if !template.contains(YEAR_PLACEHOLDER) {
                return Err(Error::config(format!(
                    "source template '{template}' does not contain {YEAR_PLACEHOLDER}"
                )));
            }
        }

        Ok(Self {
            tabular_template,
            geometry_template,
        })
    }

    /// Location of the tabular file for `year`.
    pub fn tabular(&self, year: Year) -> String {
        self.tabular_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    /// Location of the geometry file for `year`.
    pub fn geometry(&self, year: Year) -> String {
        self.geometry_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            tabular_template: Self::DEFAULT_TABULAR.to_string(),
            geometry_template: Self::DEFAULT_GEOMETRY.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
