/// Application settings loaded from config.toml and the environment
pub mod app;

/// Database connection and table creation for the embedded remote
pub mod database;

pub use app::{AppConfig, RemoteConfig, RemoteKind, SnapshotConfig, StorageConfig, load_app_configuration};
