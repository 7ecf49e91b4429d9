//! Infrastructure layer: storage, the remote product catalog, order assembly
//! orchestration, and configuration.

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod store;

pub use assembler::{AssembleError, OrderAssembler};
pub use catalog::{CatalogError, HttpProductClient, ProductCatalog, StoreCatalog};
pub use config::{ConfigError, DatabaseConfig, OrderServiceConfig, ProductServiceConfig};
pub use store::{
    InMemoryOrderStore, InMemoryProductStore, OrderStore, PostgresOrderStore,
    PostgresProductStore, ProductStore, StoreError,
};
