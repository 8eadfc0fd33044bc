//! Application configuration loading from config.toml
//!
//! Every section is optional: a missing file or a missing key falls back to the
//! defaults below, so a fresh checkout runs without any configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "PUB_EXPRESS_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database file location
    pub database: DatabaseConfig,
    /// Monthly backup settings
    pub backup: BackupConfig,
    /// Supervisor provisioning
    pub supervisor: SupervisorConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// TCP port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[database]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the `SQLite` file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/pub_express.db"),
        }
    }
}

/// `[backup]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Whether the startup backup runs at all
    pub enabled: bool,
    /// Directory receiving `backup_<YYYY>-<MM>.db` copies
    pub directory: PathBuf,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("backups"),
        }
    }
}

/// `[supervisor]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// PIN given to the supervisor record created on first start
    pub default_pin: String,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            default_pin: "1234".to_string(),
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a value has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or does not parse.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration from `PUB_EXPRESS_CONFIG` (or
/// `./config.toml`), falling back to defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from);

    if !path.exists() {
        info!(
            "No configuration file at {}, using defaults.",
            path.display()
        );
        return Ok(AppConfig::default());
    }

    let config = load_config(&path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
