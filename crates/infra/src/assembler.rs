//! Order creation: validate → one batch fetch → assemble → persist.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use storefront_core::OrderId;
use storefront_orders::{assemble, distinct_product_ids, validate_lines, Order, OrderError, OrderLineRequest};

use crate::catalog::{CatalogError, ProductCatalog};
use crate::store::{OrderStore, StoreError};

/// Why an order could not be created.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("product service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("invalid product service response: {0}")]
    InvalidRemoteResponse(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CatalogError> for AssembleError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unavailable(msg) => Self::RemoteUnavailable(msg),
            CatalogError::InvalidResponse(msg) => Self::InvalidRemoteResponse(msg),
        }
    }
}

/// Builds orders from creation requests.
///
/// Exactly one catalog call per request, whatever the number of lines. Nothing is
/// written unless every requested product resolved.
#[derive(Clone)]
pub struct OrderAssembler {
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderStore>,
}

impl OrderAssembler {
    pub fn new(catalog: Arc<dyn ProductCatalog>, orders: Arc<dyn OrderStore>) -> Self {
        Self { catalog, orders }
    }

    #[instrument(skip_all, fields(lines = lines.len()), err)]
    pub async fn create_order(&self, lines: &[OrderLineRequest]) -> Result<Order, AssembleError> {
        validate_lines(lines)?;

        let ids = distinct_product_ids(lines);
        let products = self.catalog.fetch_products(&ids).await?;
        debug!(
            requested = ids.len(),
            resolved = products.len(),
            "fetched product batch"
        );

        // Postgres keeps microseconds; the returned order must match what is read back.
        let order_date = Utc::now().trunc_subsecs(6);
        let order = assemble(OrderId::new(), lines, &products, order_date).inspect_err(|e| {
            if let OrderError::ProductNotFound(product_id) = e {
                warn!(%product_id, "order rejected: product not found");
            }
        })?;

        let stored = self.orders.create(order).await?;
        info!(
            order_id = %stored.id_typed(),
            total = %stored.total(),
            items = stored.items().len(),
            "order created"
        );
        Ok(stored)
    }
}
