//! Persistence façades for both services.
//!
//! Each store is capability-oriented: create, find-by-id, find-all (plus a batch
//! lookup for products). There is no update or delete.

use async_trait::async_trait;

use storefront_core::{DomainError, OrderId, ProductId};
use storefront_orders::Order;
use storefront_products::{NewProduct, Product};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryOrderStore, InMemoryProductStore};
pub use postgres::{PostgresOrderStore, PostgresProductStore};

/// Storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record was rejected by domain validation before it was written.
    #[error(transparent)]
    Invalid(#[from] DomainError),
    /// A record with the same id already exists.
    #[error("duplicate record: {0}")]
    Duplicate(String),
    /// Stored data could not be mapped back to a domain record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// Backend failure (connection, query, lock).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Product catalog storage (owned by the product service).
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Validate, assign a fresh id, and persist.
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Batch lookup. Unknown ids are silently absent from the result.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;
}

/// Order aggregate storage (owned by the order service).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order and all of its items as one unit.
    async fn create(&self, order: Order) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// All orders, oldest first, each with its items in line order.
    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;
}
