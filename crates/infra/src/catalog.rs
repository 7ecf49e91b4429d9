//! Remote product catalog as seen from the order service.
//!
//! The order service never touches product storage directly; it resolves a batch
//! of ids through [`ProductCatalog`]. In production that is [`HttpProductClient`]
//! calling the product service's batch endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::instrument;

use storefront_core::ProductId;
use storefront_products::Product;

use crate::store::ProductStore;

/// Failure to resolve a product batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// The product service could not be reached, timed out, or failed (5xx).
    #[error("product service unavailable: {0}")]
    Unavailable(String),
    /// The product service answered with something we cannot use.
    #[error("invalid response from product service: {0}")]
    InvalidResponse(String),
}

/// Batch product lookup.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Return the products found for `ids`, in any order.
    ///
    /// Missing ids are simply absent; callers decide whether that is fatal.
    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;
}

/// HTTP client for the product service's `GET /products/list?ids=…` endpoint.
#[derive(Debug, Clone)]
pub struct HttpProductClient {
    client: reqwest::Client,
    list_url: String,
}

impl HttpProductClient {
    /// `base_url` is the product service root, e.g. `http://product-service:8081`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            list_url: format!("{}/products/list", base_url.trim_end_matches('/')),
        })
    }

    pub fn list_url(&self) -> &str {
        &self.list_url
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl ProductCatalog for HttpProductClient {
    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .client
            .get(&self.list_url)
            .query(&[("ids", join_ids(ids))])
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CatalogError::Unavailable(format!("product service returned {status}")));
        }
        if status != StatusCode::OK {
            return Err(CatalogError::InvalidResponse(format!(
                "product service returned {status}"
            )));
        }

        response
            .json::<Vec<Product>>()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }
}

/// Catalog backed directly by a local product store (single-process setups and tests).
#[derive(Clone)]
pub struct StoreCatalog {
    store: Arc<dyn ProductStore>,
}

impl StoreCatalog {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductCatalog for StoreCatalog {
    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        self.store
            .find_by_ids(ids)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}
