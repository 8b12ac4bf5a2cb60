//! Moving product lists between devices: JSON export, checked import, and the
//! published snapshot.

mod snapshot;
mod validation;

pub use snapshot::{SNAPSHOT_FILE_NAME, SnapshotClient, SnapshotComparison};
pub use validation::{ImportError, parse_import};

use crate::errors::Result;
use crate::models::Product;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pretty-printed JSON array without the reconciler flags.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn export_products(products: &[Product]) -> Result<String> {
    let cleared: Vec<Product> = products.iter().cloned().map(Product::confirmed).collect();
    Ok(serde_json::to_string_pretty(&cleared)?)
}

/// `banco_produtos_<date>.json`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("banco_produtos_{}.json", date.format("%Y-%m-%d"))
}

/// Writes [`export_products`] output to `dir` under [`export_file_name`].
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn export_to_dir(dir: &Path, products: &[Product], date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, export_products(products)?)?;
    info!("Exported {} products to {}", products.len(), path.display());
    Ok(path)
}

/// Reads and checks an exported file.
///
/// # Errors
/// Returns an I/O error, or `Import` for a malformed document.
pub fn import_file(path: &Path) -> Result<Vec<Product>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(parse_import(&raw)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::sample_product;

    #[test]
    fn test_export_clears_flags() {
        let products = vec![
            sample_product("a", "Arroz").flagged(true),
            sample_product("b", "Feijão"),
        ];
        let json = export_products(&products).unwrap();
        assert!(!json.contains("_pendingSync"));
        assert!(!json.contains("_offline"));
        assert!(json.contains("\n  {"));

        let back = parse_import(&json).unwrap();
        assert_eq!(back, vec![products[0].clone().confirmed(), products[1].clone()]);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        assert_eq!(export_file_name(date), "banco_produtos_2024-07-03.json");
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        let path = export_to_dir(dir.path(), &[sample_product("a", "Arroz")], date).unwrap();

        let imported = import_file(&path).unwrap();
        assert_eq!(imported, vec![sample_product("a", "Arroz")]);
    }

    #[test]
    fn test_import_file_rejects_bad_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"produtos": []}"#).unwrap();

        assert!(matches!(
            import_file(&path).unwrap_err(),
            Error::Import(ImportError::NotAnArray)
        ));
        assert!(matches!(
            import_file(&dir.path().join("missing.json")).unwrap_err(),
            Error::Io(_)
        ));
    }
}
