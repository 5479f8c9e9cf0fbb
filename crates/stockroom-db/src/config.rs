//! # Settings
//!
//! Runtime configuration for the database layer and its binaries.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKROOM_DATABASE_PATH=/var/lib/stockroom/stockroom.db            │
//! │     STOCKROOM_MAX_CONNECTIONS=8                                        │
//! │     STOCKROOM_PAGE_SIZE=50                                             │
//! │     STOCKROOM_LOG=debug,sqlx=warn                                      │
//! │                                                                         │
//! │  2. TOML Config File (path given by the caller)                        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockroom.toml
//! database_path = "./stockroom.db"
//! max_connections = 5
//! default_page_size = 20
//! log_filter = "info,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::pool::DbConfig;
use crate::repository::product::PageQuery;
use stockroom_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Configuration load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything the pool, catalog and binaries need to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// Catalog page size when the caller does not choose one.
    pub default_page_size: u32,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_path: PathBuf::from("stockroom.db"),
            max_connections: 5,
            default_page_size: DEFAULT_PAGE_SIZE,
            log_filter: "info,sqlx=warn".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from defaults, an optional file, and the environment.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file, if a path is given and it exists
    /// 3. `STOCKROOM_*` environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading settings from file");
                let contents = std::fs::read_to_string(path)?;
                settings = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".into()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    /// Applies `STOCKROOM_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOCKROOM_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(max) = lookup("STOCKROOM_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring non-numeric STOCKROOM_MAX_CONNECTIONS"),
            }
        }

        if let Some(size) = lookup("STOCKROOM_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(n) => self.default_page_size = n,
                Err(_) => warn!(value = %size, "Ignoring non-numeric STOCKROOM_PAGE_SIZE"),
            }
        }

        if let Some(filter) = lookup("STOCKROOM_LOG") {
            self.log_filter = filter;
        }
    }

    /// Pool configuration for these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }

    /// An unfiltered catalog query at the configured page size.
    pub fn page_query(&self) -> PageQuery {
        PageQuery::default().page_size(self.default_page_size)
    }

    /// Log filter, falling back to `info` when the directive doesn't parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_filter).unwrap_or_else(|e| {
            warn!(filter = %self.log_filter, error = %e, "Invalid log filter, using info");
            EnvFilter::new("info")
        })
    }
}
