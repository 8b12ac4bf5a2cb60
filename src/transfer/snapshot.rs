//! The published snapshot: a product file served from a public raw URL.
//!
//! Devices share data by exporting, committing the file, and pulling it on the
//! other side. Nothing here writes to the local store; checking only compares
//! dates and downloading only saves the file for a later import.

use super::validation::parse_import;
use crate::errors::{Error, Result};
use crate::models::{Product, latest_purchase};
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Name the downloaded snapshot is saved under.
pub const SNAPSHOT_FILE_NAME: &str = "banco_produtos.json";

/// Latest purchase date on each side, used as the dataset "version".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotComparison {
    /// Latest local purchase, `None` when there are no local products
    pub local: Option<NaiveDate>,
    /// Latest purchase in the snapshot, `None` when it is empty
    pub remote: Option<NaiveDate>,
}

impl SnapshotComparison {
    /// Compares two product lists.
    #[must_use]
    pub fn compare(local: &[Product], remote: &[Product]) -> Self {
        Self {
            local: latest_purchase(local),
            remote: latest_purchase(remote),
        }
    }

    /// True when the snapshot has purchases newer than anything local.
    #[must_use]
    pub fn remote_is_newer(&self) -> bool {
        match (self.local, self.remote) {
            (Some(local), Some(remote)) => remote > local,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

fn describe(date: Option<NaiveDate>, empty: &str) -> String {
    date.map_or_else(|| empty.to_string(), |d| d.format("%d/%m/%Y").to_string())
}

impl fmt::Display for SnapshotComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Local: {} | GitHub: {}",
            describe(self.local, "Sem produtos"),
            describe(self.remote, "Vazio")
        )
    }
}

/// Fetches the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    url: String,
    http: Client,
}

impl SnapshotClient {
    /// Client for the raw file at `url`.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            http: Client::builder().timeout(timeout).build()?,
        })
    }

    /// The snapshot URL with a `t=<millis>` cache buster appended.
    fn cache_busted_url(&self, millis: i64) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}t={millis}", self.url)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching snapshot from {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                message: "Snapshot file not found".to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Downloads and validates the snapshot, bypassing caches.
    ///
    /// # Errors
    /// Returns an HTTP error, or `Import` if the file is not a product list.
    pub async fn fetch(&self) -> Result<Vec<Product>> {
        let url = self.cache_busted_url(Utc::now().timestamp_millis());
        let raw = self.get_text(&url).await?;
        Ok(parse_import(&raw)?)
    }

    /// Fetches the snapshot and compares it with `local`.
    ///
    /// # Errors
    /// Same as [`Self::fetch`].
    pub async fn check(&self, local: &[Product]) -> Result<SnapshotComparison> {
        let remote = self.fetch().await?;
        let comparison = SnapshotComparison::compare(local, &remote);
        info!("Snapshot check: {}", comparison);
        Ok(comparison)
    }

    /// Saves the snapshot unchanged as `dir/banco_produtos.json`.
    ///
    /// # Errors
    /// Returns an HTTP error or an I/O error.
    pub async fn download(&self, dir: &Path) -> Result<PathBuf> {
        let raw = self.get_text(&self.url).await?;
        let path = dir.join(SNAPSHOT_FILE_NAME);
        std::fs::write(&path, raw)?;
        info!("Snapshot saved to {}", path.display());
        Ok(path)
    }
}
