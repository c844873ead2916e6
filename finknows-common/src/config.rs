//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration comes from a single TOML file. A missing file is
//! not fatal: the service logs a warning and starts with built-in defaults.
//!
//! Config file lookup order:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`FINKNOWS_CONFIG`)
//! 3. Platform config directory (`~/.config/finknows/config.toml` on Linux)
//!
//! Data folder resolution order:
//! 1. Command-line argument (`--data-dir`)
//! 2. Environment variable (`FINKNOWS_DATA_DIR`)
//! 3. `data_dir` key in the TOML file
//! 4. OS-dependent compiled default

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FINKNOWS_CONFIG";

/// Environment variable overriding the data folder
pub const DATA_DIR_ENV_VAR: &str = "FINKNOWS_DATA_DIR";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Folder holding feedback data (optional, see module docs for resolution)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            data_dir: None,
            storage: StorageConfig::default(),
            classifier: ClassifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Feedback storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Where feedback events and statistics are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per event plus `statistics.json` in the data folder
    #[default]
    Json,
    /// SQLite database `feedback.db` in the data folder
    Sqlite,
    /// Process memory only (nothing survives a restart)
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageBackend::Json => "json",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        })
    }
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}' (expected json, sqlite or memory)",
                other
            ))),
        }
    }
}

/// Upstream classifier connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// URL accepting `POST {"text": ...}` and returning `{"scores": [neg, neu, pos]}`
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_classifier_endpoint(),
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
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

fn default_bind_address() -> String {
    "0.0.0.0:5001".to_string()
}

fn default_classifier_endpoint() -> String {
    "http://127.0.0.1:8501/classify".to_string()
}

fn default_classifier_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config file {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

/// Load the bootstrap configuration
///
/// An explicitly named file (CLI or environment) must exist and parse. The
/// platform default location is optional: when absent, defaults are used.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = cli_path {
        info!("Loading configuration from {} (command line)", path.display());
        return TomlConfig::from_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        info!("Loading configuration from {} ({})", path.display(), CONFIG_ENV_VAR);
        return TomlConfig::from_file(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            TomlConfig::from_file(&path)
        }
        _ => {
            warn!("No configuration file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Platform config file location (`<config_dir>/finknows/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("finknows").join("config.toml"))
}

/// Resolve the data folder following the module-level priority order
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.data_dir {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_data_dir()
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("finknows").join("feedback_data"))
        .unwrap_or_else(|| PathBuf::from("./feedback_data"))
}

/// Create the data folder if it does not exist yet
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created data folder: {}", path.display());
    }
    Ok(())
}
