//! The remote CRUD contract and its implementations.
//!
//! | operation          | HTTP                          |
//! |--------------------|-------------------------------|
//! | `list_products`    | `GET /products`               |
//! | `get_product`      | `GET /products/{id}`          |
//! | `create_product`   | `POST /products`              |
//! | `update_product`   | `PUT /products/{id}`          |
//! | `delete_product`   | `DELETE /products/{id}`       |
//! | `search_products`  | `GET /products/search?q=`     |

mod database;
mod http;

pub use database::DatabaseRemote;
pub use http::HttpRemote;

use crate::errors::Result;
use crate::models::{NewProduct, Product, ProductPatch};
use async_trait::async_trait;

/// Server-side source of truth while online.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All products, newest purchase first.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// A single product.
    async fn get_product(&self, id: &str) -> Result<Product>;

    /// Creates a product; the server assigns the id and recomputes the total.
    async fn create_product(&self, data: NewProduct) -> Result<Product>;

    /// Partially updates a product and returns the stored result.
    async fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product>;

    /// Deletes a product and returns what was removed.
    async fn delete_product(&self, id: &str) -> Result<Product>;

    /// Name/brand substring search, case-insensitive.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    async fn list_products(&self) -> Result<Vec<Product>> {
        (**self).list_products().await
    }

    async fn get_product(&self, id: &str) -> Result<Product> {
        (**self).get_product(id).await
    }

    async fn create_product(&self, data: NewProduct) -> Result<Product> {
        (**self).create_product(data).await
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        (**self).update_product(id, patch).await
    }

    async fn delete_product(&self, id: &str) -> Result<Product> {
        (**self).delete_product(id).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        (**self).search_products(query).await
    }
}
