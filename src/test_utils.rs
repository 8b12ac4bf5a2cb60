//! Shared test utilities for `controle-precos`.
//!
//! This module provides helpers for setting up test databases, product
//! fixtures with fixed dates, and reconcilers wired to in-process stores.

use crate::{
    core::product,
    errors::{Error, Result},
    models::{NewProduct, Product, purchase_date},
    remote::DatabaseRemote,
    storage::MemoryStore,
    sync::{Connectivity, OfflineReconciler},
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per test binary.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a stored product with sensible defaults.
///
/// # Defaults
/// * quantidade: 1.0
/// * `valor_unitario`: 10.0
/// * `data_compra`: today
pub async fn create_test_product(db: &DatabaseConnection, name: &str) -> Result<Product> {
    product::create_product(db, NewProduct::new(name, 1.0, 10.0)).await
}

/// Creates a stored product bought on `date` (`YYYY-MM-DD`).
pub async fn create_dated_product(
    db: &DatabaseConnection,
    name: &str,
    date: &str,
) -> Result<Product> {
    let data_compra = purchase_date::parse(date).ok_or_else(|| Error::InvalidProduct {
        message: format!("bad test date {date}"),
    })?;
    product::create_product(
        db,
        NewProduct::new(name, 1.0, 10.0).with_data_compra(data_compra),
    )
    .await
}

/// An unsaved, confirmed product bought on 2024-01-15.
///
/// # Defaults
/// * quantidade: 1.0 un
/// * `valor_unitario` / `valor_total`: 10.0
/// * mercado: "Mercado Central"
#[must_use]
pub fn sample_product(id: &str, nome: &str) -> Product {
    let data_compra = purchase_date::parse("2024-01-15").unwrap_or_default();
    Product::from_new(
        id.to_string(),
        NewProduct::new(nome, 1.0, 10.0)
            .with_mercado("Mercado Central")
            .with_data_compra(data_compra),
    )
}

/// The documented internal-failure response of the remote store.
#[must_use]
pub fn remote_failure() -> Error {
    Error::RemoteStatus {
        status: 500,
        message: "Erro interno do servidor".to_string(),
    }
}

/// A reconciler over an in-memory local store and an in-memory `SQLite`
/// remote. Nothing is loaded yet.
pub async fn database_reconciler(
    connectivity: Connectivity,
) -> Result<OfflineReconciler<MemoryStore, DatabaseRemote>> {
    let db = setup_test_db().await?;
    Ok(OfflineReconciler::new(
        MemoryStore::new(),
        DatabaseRemote::new(db),
        connectivity,
    ))
}
