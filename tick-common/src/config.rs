//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from, in priority order:
//! 1. Command-line argument / environment variable (resolved by the binary)
//! 2. TOML config file
//! 3. Built-in defaults
//!
//! A missing TOML file never prevents startup; only an explicitly requested
//! file that cannot be read or parsed is an error.

use crate::cities::{City, CityTable};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TICK_ROOT_FOLDER";

/// Application directory name under the platform config/data dirs
const APP_DIR: &str = "tick-tracker";

/// Database file name inside the root folder
const DATABASE_FILE: &str = "tick_tracker.db";

pub const DEFAULT_FEED_URL: &str = "https://dev-task.elancoapps.com/sightings";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 6;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Settings read from `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Data directory holding the database, seed file and uploads
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Bootstrap snapshot (relative paths resolve against the root folder)
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Attachment storage (relative paths resolve against the root folder)
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    /// Optional static frontend served under `/app` and `/static`
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Replaces the built-in coordinate table when non-empty
    #[serde(default)]
    pub cities: Vec<City>,
}

/// External sighting feed settings
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,

    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_feed_timeout_secs(),
            enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_feed_timeout_secs() -> u64 {
    DEFAULT_FEED_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the explicit file if given, else the platform default if present
    ///
    /// Problems with the platform default file are logged and fall back to
    /// built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!("{} - using built-in defaults", e);
                    Ok(Self::default())
                }
            },
            _ => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Coordinate table from `[[cities]]`, or the built-in UK table
    pub fn city_table(&self) -> CityTable {
        if self.cities.is_empty() {
            CityTable::uk_defaults()
        } else {
            CityTable::new(self.cities.clone())
        }
    }
}

/// `<config_dir>/tick-tracker/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Root folder resolution:
/// 1. Command-line argument (highest priority)
/// 2. `TICK_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./tick_data"))
}

/// Database file inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Resolve `path` against `root_folder` unless it is already absolute
pub fn resolve_in_root(root_folder: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_folder.join(path)
    }
}
