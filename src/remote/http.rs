//! reqwest client for the products HTTP API.

use super::RemoteStore;
use crate::errors::{Error, Result};
use crate::models::{NewProduct, Product, ProductPatch};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP implementation of [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    http: Client,
}

/// Body of every documented error response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpRemote {
    /// Client for the API rooted at `base_url` (the `/products` routes hang off it).
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/products/{id}", self.base_url)
    }

    fn search_url(&self) -> String {
        format!("{}/products/search", self.base_url)
    }

    /// True when the list endpoint answers with a success status.
    pub async fn probe(&self) -> bool {
        match self.http.get(self.collection_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Remote probe failed: {}", e);
                false
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body);
        warn!("Remote store rejected request: {}", err);
        Err(err)
    }
}

/// Maps a non-2xx response to `RemoteStatus`, preferring the `error` field.
fn status_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string());
    Error::RemoteStatus {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let response = self.http.get(self.collection_url()).send().await?;
        Self::decode(response).await
    }

    async fn get_product(&self, id: &str) -> Result<Product> {
        let response = self.http.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ProductNotFound { id: id.to_string() });
        }
        Self::decode(response).await
    }

    async fn create_product(&self, data: NewProduct) -> Result<Product> {
        let response = self
            .http
            .post(self.collection_url())
            .json(&data)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        let response = self.http.put(self.item_url(id)).json(&patch).send().await?;
        Self::decode(response).await
    }

    async fn delete_product(&self, id: &str) -> Result<Product> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        Self::decode(response).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let response = self
            .http
            .get(self.search_url())
            .query(&[("q", query)])
            .send()
            .await?;
        Self::decode(response).await
    }
}
