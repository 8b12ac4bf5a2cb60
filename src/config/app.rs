//! Application configuration loading from config.toml
//!
//! Every section is optional; a missing file yields the defaults. A few values
//! can be overridden from the environment (typically through `.env`):
//! `DATABASE_URL` for the embedded remote and `PRECOS_REMOTE_URL` for the HTTP
//! remote. `PRECOS_CONFIG` points at a config file other than `./config.toml`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw file published by the desktop device and fetched by the others.
pub const DEFAULT_SNAPSHOT_URL: &str =
    "https://raw.githubusercontent.com/Bosguega/controle_precos/master/banco_produtos.json";

/// Local-storage key holding the product list.
pub const DEFAULT_STORAGE_KEY: &str = "produtos_offline";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the offline product list lives
    pub storage: StorageConfig,
    /// Which remote store to talk to
    pub remote: RemoteConfig,
    /// Published snapshot used for manual device sync
    pub snapshot: SnapshotConfig,
}

/// `[storage]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per key
    pub dir: PathBuf,
    /// Key (file stem) of the product list
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Kind of remote store backing the reconciler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    /// The CRUD HTTP API at `base_url`
    Http,
    /// The embedded `SQLite` table at `database_url`
    #[default]
    Database,
}

/// `[remote]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Backend selection
    pub kind: RemoteKind,
    /// Base URL of the HTTP API (the `/products` routes hang off it)
    pub base_url: String,
    /// Database URL for the embedded remote; `DATABASE_URL` wins when set
    pub database_url: Option<String>,
    /// Per-request timeout for the HTTP remote
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            kind: RemoteKind::default(),
            base_url: "http://localhost:3000".to_string(),
            database_url: None,
            timeout_secs: 10,
        }
    }
}

/// `[snapshot]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Raw-file URL of the published JSON export
    pub url: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SNAPSHOT_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    /// Returns `Config` if the TOML syntax is invalid or a field has the wrong type.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `PRECOS_REMOTE_URL` and `DATABASE_URL` on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PRECOS_REMOTE_URL") {
            debug!("Remote base URL overridden from environment");
            self.remote.base_url = url;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            debug!("Database URL overridden from environment");
            self.remote.database_url = Some(url);
        }
    }
}

/// Loads the configuration from a TOML file; a missing file gives the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        info!("No config file at {:?}, using defaults", path_ref);
        return Ok(AppConfig::default());
    }

    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    AppConfig::from_toml(&contents)
}

/// Loads `$PRECOS_CONFIG` (or `./config.toml`) and applies environment overrides.
///
/// # Errors
/// Returns an error if the config file exists but is invalid.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("PRECOS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = load_config(&path)?;
    config.apply_env_overrides();
    info!(
        "Configuration loaded (remote: {:?}, storage: {})",
        config.remote.kind,
        config.storage.dir.display()
    );
    Ok(config)
}
