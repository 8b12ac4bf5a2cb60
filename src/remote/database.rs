//! The remote contract served straight from the embedded `SeaORM` table.

use super::RemoteStore;
use crate::core::product;
use crate::errors::{Error, Result};
use crate::models::{NewProduct, Product, ProductPatch};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// [`RemoteStore`] over a local database connection.
///
/// Behaves like the HTTP API's server side, so the reconciler sees the same
/// id replacement and total recomputation either way.
#[derive(Debug, Clone)]
pub struct DatabaseRemote {
    db: DatabaseConnection,
}

impl DatabaseRemote {
    /// Wraps a connection whose tables already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// `GET /products?nome=`: list filtered by a name substring.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_products_named(&self, nome: &str) -> Result<Vec<Product>> {
        product::list_products(&self.db, Some(nome)).await
    }
}

#[async_trait]
impl RemoteStore for DatabaseRemote {
    async fn list_products(&self) -> Result<Vec<Product>> {
        product::list_products(&self.db, None).await
    }

    async fn get_product(&self, id: &str) -> Result<Product> {
        product::get_product(&self.db, id)
            .await?
            .ok_or_else(|| Error::ProductNotFound { id: id.to_string() })
    }

    async fn create_product(&self, data: NewProduct) -> Result<Product> {
        product::create_product(&self.db, data).await
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        product::update_product(&self.db, id, patch).await
    }

    async fn delete_product(&self, id: &str) -> Result<Product> {
        product::delete_product(&self.db, id).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        product::search_products(&self.db, query).await
    }
}
