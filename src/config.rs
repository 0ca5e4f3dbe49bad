use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Sync server settings
    pub sync: SyncConfig,
}

/// Settings for the remote sync endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the sync server, e.g. "https://sync.example.com"
    pub server_url: Option<String>,
    /// API key sent as a bearer token
    pub api_key: Option<String>,
    /// Run a sync cycle automatically after each mutation
    pub auto_sync: bool,
}

impl SyncConfig {
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            database_path: PathBuf::from(&home).join(".lifetiles").join("lifetiles.db"),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("LIFETILES_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(url) = std::env::var("LIFETILES_SYNC_URL") {
            config.sync.server_url = Some(url);
        }
        if let Ok(key) = std::env::var("LIFETILES_SYNC_API_KEY") {
            config.sync.api_key = Some(key);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/lifetiles/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("lifetiles")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
