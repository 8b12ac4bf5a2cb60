use super::{LocalStore, decode, encode};
use crate::errors::Result;
use crate::models::Product;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// One JSON file per key under a directory: `<dir>/<key>.json`.
///
/// Writes land in a sibling temp file first and are renamed over the target,
/// so a crash mid-write leaves the previous list intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store for `key` inside `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalStore for FileStore {
    fn read_all(&self) -> Result<Vec<Product>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let products = decode(&raw)?;
                trace!("Read {} products from {:?}", products.len(), self.path);
                Ok(products)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, products: &[Product]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encode(products)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} products to {:?}", products.len(), self.path);
        Ok(())
    }
}
