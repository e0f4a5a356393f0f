//! # Back-Office Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDSTORE_STORE_BACKEND=memory                                      │
//! │     MEDSTORE_DB_PATH=/var/lib/medstore/medstore.db                     │
//! │     MEDSTORE_LOW_STOCK_THRESHOLD=5                                     │
//! │     MEDSTORE_LOG_FILTER=debug                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/backoffice/backoffice.toml (Linux)                       │
//! │     ~/Library/Application Support/com.medstore.backoffice/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SQLite store in the platform data dir, threshold 10                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! backend = "sqlite"   # sqlite | memory
//! path = "/var/lib/medstore/medstore.db"
//! max_connections = 5
//!
//! [inventory]
//! low_stock_threshold = 10
//!
//! [logging]
//! filter = "info,medstore=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use medstore_core::LOW_STOCK_THRESHOLD;

/// Default `tracing` filter when neither `RUST_LOG` nor the file sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,medstore=debug,sqlx=warn";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config file: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No explicit path and no platform config directory.
    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Store Settings
// =============================================================================

/// Which [`DocumentStore`](medstore_db::DocumentStore) backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Persistent SQLite document table.
    #[default]
    Sqlite,

    /// Process-local store; contents are lost on exit.
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "file" => Ok(StoreBackend::Sqlite),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown store backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// SQLite file. Defaults to `medstore.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            backend: StoreBackend::default(),
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Inventory & Logging Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    /// A medicine is low on stock when `stock < low_stock_threshold`.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    LOW_STOCK_THRESHOLD
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` still wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Back-Office Configuration
// =============================================================================

/// Complete back-office configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackofficeConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl BackofficeConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (backoffice.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading back-office config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load back-office config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Back-office config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.inventory.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "low_stock_threshold must not be negative".into(),
            ));
        }

        if let Some(ref path) = self.store.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("store path must not be empty".into()));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("MEDSTORE_STORE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding store backend from environment");
                    self.store.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown store backend in environment"),
            }
        }

        if let Ok(path) = std::env::var("MEDSTORE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.path = Some(PathBuf::from(path));
        }

        if let Ok(threshold) = std::env::var("MEDSTORE_LOW_STOCK_THRESHOLD") {
            if let Ok(t) = threshold.parse::<i64>() {
                self.inventory.low_stock_threshold = t;
            }
        }

        if let Ok(filter) = std::env::var("MEDSTORE_LOG_FILTER") {
            self.logging.filter = filter;
        }
    }

    /// `<config_dir>/backoffice.toml` for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "medstore", "backoffice")
            .map(|dirs| dirs.config_dir().join("backoffice.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// SQLite file to open: the configured path, else the platform data dir,
    /// else `./medstore.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.store.path {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "medstore", "backoffice")
            .map(|dirs| dirs.data_dir().join("medstore.db"))
            .unwrap_or_else(|| PathBuf::from("medstore.db"))
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.inventory.low_stock_threshold
    }

    /// Config for tests and throwaway sessions.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.store.backend = StoreBackend::Memory;
        config
    }
}
