//! Pure order assembly: requested lines + fetched products → `Order`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_core::{Money, OrderId, OrderItemId, ProductId};
use storefront_products::Product;

use crate::order::{Order, OrderItem, OrderLineRequest};

/// Order-level failure. Any of these aborts the whole order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("invalid quantity {quantity} for product {product_id}: must be between 1 and {max}", max = u32::MAX)]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("order total exceeds the representable amount")]
    AmountOverflow,
}

fn checked_quantity(line: &OrderLineRequest) -> Result<u32, OrderError> {
    u32::try_from(line.quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(OrderError::InvalidQuantity {
            product_id: line.product_id,
            quantity: line.quantity,
        })
}

/// Reject requests that can never produce an order, before any remote call.
pub fn validate_lines(lines: &[OrderLineRequest]) -> Result<(), OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    for line in lines {
        checked_quantity(line)?;
    }
    Ok(())
}

/// Distinct product ids in first-seen order (the batch lookup key set).
pub fn distinct_product_ids(lines: &[OrderLineRequest]) -> Vec<ProductId> {
    let mut seen = HashSet::with_capacity(lines.len());
    lines
        .iter()
        .map(|line| line.product_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Build the order aggregate from requested lines and the fetched product batch.
///
/// Every requested line becomes one item, in request order; duplicates of the same
/// product stay separate items. Products the batch did not return fail the whole
/// order with [`OrderError::ProductNotFound`] for the first missing id.
pub fn assemble(
    order_id: OrderId,
    lines: &[OrderLineRequest],
    products: &[Product],
    now: DateTime<Utc>,
) -> Result<Order, OrderError> {
    validate_lines(lines)?;

    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let product = by_id
            .get(&line.product_id)
            .ok_or(OrderError::ProductNotFound(line.product_id))?;

        items.push(OrderItem {
            id: OrderItemId::new(),
            product_id: product.id,
            product_name: product.name.clone(),
            price: product.price,
            quantity: checked_quantity(line)?,
        });
    }

    let line_totals = items
        .iter()
        .map(OrderItem::line_total)
        .collect::<Option<Vec<_>>>()
        .ok_or(OrderError::AmountOverflow)?;
    let total = Money::checked_sum(line_totals).ok_or(OrderError::AmountOverflow)?;

    Ok(Order::restore(order_id, now, total, items))
}
