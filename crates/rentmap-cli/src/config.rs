//! Rentmap configuration.
//!
//! Resolution order for the config file:
//!
//! 1. `--config <path>` (must exist)
//! 2. `RENTMAP_CONFIG`
//! 3. `<config dir>/rentmap/config.toml`
//!
//! A missing file at steps 2 or 3 means built-in defaults. After the file,
//! `RENTMAP_<SECTION>_<KEY>` environment variables override single values
//! (`RENTMAP_SERVER_PORT=9000`), matching what `config export` prints.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use rentmap_core::{Error, Result, YearRange};
use rentmap_index::DuplicatePolicy;
use rentmap_ingest::SourceLayout;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RENTMAP_CONFIG";

/// Prefix for exported environment variables.
pub const ENV_PREFIX: &str = "RENTMAP";

// ============================================================================
// Sections
// ============================================================================

/// Where the yearly files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory or `http(s)://` base URL.
    pub root: String,
    /// Tabular file template containing `{year}`.
    pub tabular_template: String,
    /// Geometry file template containing `{year}`.
    pub geometry_template: String,
    /// Optional FIPS directory CSV, relative to `root`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fips_file: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            tabular_template: SourceLayout::DEFAULT_TABULAR.to_string(),
            geometry_template: SourceLayout::DEFAULT_GEOMETRY.to_string(),
            fips_file: None,
        }
    }
}

/// Index build options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Handling of repeated tract names.
    pub duplicate_policy: DuplicatePolicy,
}

/// HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
        }
    }
}

// ============================================================================
// RentmapConfig
// ============================================================================

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentmapConfig {
    /// Input files.
    pub data: DataConfig,
    /// Years to load.
    pub years: YearRange,
    /// Index build options.
    pub index: IndexConfig,
    /// HTTP listener.
    pub server: ServerConfig,
}

impl RentmapConfig {
    /// Name used for the config directory and in hints.
    pub fn project_name() -> &'static str {
        "rentmap"
    }

    /// `<config dir>/rentmap/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::project_name()).join("config.toml"))
    }

    /// Resolve the config file path without checking that it exists.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Some(path) = std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Load and validate the configuration, with overrides from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// `Config` if an explicit path does not exist, or if the file or an
    /// override does not parse or validate.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let vars = std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
        Self::load_with_env(explicit, vars)
    }

    /// Like [`load`](Self::load), reading overrides from `vars` instead of the
    /// process environment.
    pub fn load_with_env<I>(explicit: Option<&str>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
                Self::from_toml_str(&content)
                    .map_err(|e| Error::config(format!("{}: {e}", path.display())))?
            }
            Some(path) if explicit.is_some() => {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };

        let config = config.with_env_overrides(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without validating.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check cross-field constraints, including that `server.host` resolves.
    pub fn validate(&self) -> Result<()> {
        self.years.validate()?;
        self.layout()?;
        if self.data.root.trim().is_empty() {
            return Err(Error::config("data.root must not be empty"));
        }
        if self.server.host.trim().is_empty() {
            return Err(Error::config("server.host must not be empty"));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Apply `RENTMAP_<SECTION>_<KEY>` overrides, the inverse of
    /// [`to_env_vars`](Self::to_env_vars).
    ///
    /// Variables that name no section are ignored. A value replacing an
    /// integer, float, or boolean must parse as one; anything else is taken
    /// as a string.
    pub fn with_env_overrides<I>(self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value = toml::Value::try_from(&self).map_err(|e| Error::config(e.to_string()))?;
        let Some(root) = value.as_table_mut() else {
            return Ok(self);
        };

        let mut applied = 0usize;
        for (name, raw) in vars {
            let Some((section, key)) = name
                .strip_prefix(ENV_PREFIX)
                .and_then(|rest| rest.strip_prefix('_'))
                .and_then(|rest| rest.split_once('_'))
            else {
                continue;
            };
            let Some(table) = root
                .get_mut(&section.to_lowercase())
                .and_then(toml::Value::as_table_mut)
            else {
                continue;
            };

            let key = key.to_lowercase();
            let parsed = env_value(&name, &raw, table.get(&key))?;
            log::debug!("Config override from {name}");
            table.insert(key, parsed);
            applied += 1;
        }

        if applied == 0 {
            return Ok(self);
        }
        let config: Self = value
            .try_into()
            .map_err(|e| Error::config(format!("environment override: {e}")))?;
        Ok(config)
    }

    /// Replace `data.root`.
    pub fn with_data_root(mut self, root: impl Into<String>) -> Self {
        self.data.root = root.into();
        self
    }

    /// File layout from the templates.
    pub fn layout(&self) -> Result<SourceLayout> {
        SourceLayout::new(&self.data.tabular_template, &self.data.geometry_template)
    }

    /// Listener address from `server.host` and `server.port`.
    ///
    /// Host names such as `localhost` are resolved; the first address wins.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = self.server.host.as_str();
        let port = self.server.port;
        (host, port)
            .to_socket_addrs()
            .map_err(|e| Error::config(format!("invalid server address {host}:{port}: {e}")))?
            .next()
            .ok_or_else(|| Error::config(format!("server host {host} resolved to no addresses")))
    }

    /// Flatten to `RENTMAP_SECTION_KEY=value` pairs.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_env(ENV_PREFIX, &value, &mut vars);
        Ok(vars)
    }
}

fn env_value(name: &str, raw: &str, current: Option<&toml::Value>) -> Result<toml::Value> {
    let invalid = |kind: &str| Error::config(format!("{name}={raw} is not a valid {kind}"));
    let value = match current {
        Some(toml::Value::Integer(_)) => {
            toml::Value::Integer(raw.trim().parse().map_err(|_| invalid("integer"))?)
        }
        Some(toml::Value::Float(_)) => {
            toml::Value::Float(raw.trim().parse().map_err(|_| invalid("float"))?)
        }
        Some(toml::Value::Boolean(_)) => {
            toml::Value::Boolean(raw.trim().parse().map_err(|_| invalid("boolean"))?)
        }
        _ => toml::Value::String(raw.to_string()),
    };
    Ok(value)
}

fn flatten_env(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                flatten_env(&format!("{prefix}_{}", key.to_uppercase()), child, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
