use std::sync::Arc;

use anyhow::Context;

use storefront_infra::{
    store::postgres, HttpProductClient, InMemoryOrderStore, InMemoryProductStore,
    OrderAssembler, OrderServiceConfig, OrderStore, PostgresOrderStore, PostgresProductStore,
    ProductCatalog, ProductServiceConfig, ProductStore,
};

/// Wiring for the product service.
#[derive(Clone)]
pub struct ProductServices {
    store: Arc<dyn ProductStore>,
}

impl ProductServices {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()))
    }

    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub async fn from_config(config: &ProductServiceConfig) -> anyhow::Result<Self> {
        let Some(db) = &config.database else {
            tracing::warn!("DATABASE_URL not set; products are kept in memory");
            return Ok(Self::in_memory());
        };

        let pool = postgres::connect(db)
            .await
            .context("failed to connect to postgres")?;
        postgres::ensure_schema(&pool)
            .await
            .context("failed to prepare product schema")?;
        Ok(Self::new(Arc::new(PostgresProductStore::new(pool))))
    }

    pub fn products(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }
}

/// Wiring for the order service.
#[derive(Clone)]
pub struct OrderServices {
    assembler: OrderAssembler,
    orders: Arc<dyn OrderStore>,
}

impl OrderServices {
    pub fn new(catalog: Arc<dyn ProductCatalog>, orders: Arc<dyn OrderStore>) -> Self {
        Self {
            assembler: OrderAssembler::new(catalog, orders.clone()),
            orders,
        }
    }

    pub async fn from_config(config: &OrderServiceConfig) -> anyhow::Result<Self> {
        let catalog = HttpProductClient::new(
            &config.product_service_url,
            config.product_service_timeout,
        )
        .context("failed to build product service client")?;
        tracing::info!(url = %config.product_service_url, "using product service");

        let orders: Arc<dyn OrderStore> = match &config.database {
            Some(db) => {
                let pool = postgres::connect(db)
                    .await
                    .context("failed to connect to postgres")?;
                postgres::ensure_schema(&pool)
                    .await
                    .context("failed to prepare order schema")?;
                Arc::new(PostgresOrderStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; orders are kept in memory");
                Arc::new(InMemoryOrderStore::new())
            }
        };

        Ok(Self::new(Arc::new(catalog), orders))
    }

    pub fn assembler(&self) -> &OrderAssembler {
        &self.assembler
    }

    pub fn orders(&self) -> &Arc<dyn OrderStore> {
        &self.orders
    }
}
