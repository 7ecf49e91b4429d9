use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, Money, OrderId, OrderItemId, ProductId};

/// One requested line of a creation request: which product, how many.
///
/// `quantity` is signed on purpose so that zero and negative values reach
/// validation instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Order line: snapshot of the product at order time plus the quantity.
///
/// The item has no link back to its order; the aggregate owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    /// Unit price copied from the product when the order was placed.
    pub price: Money,
    pub quantity: u32,
}

impl OrderItem {
    /// `price * quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate root: Order (header + exclusively owned items).
///
/// `total` is fixed at creation and never recomputed, even if item data is
/// later read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    order_date: DateTime<Utc>,
    total: Money,
    items: Vec<OrderItem>,
}

impl Order {
    /// Rebuild an order from persisted parts.
    ///
    /// Stores use this when loading; new orders come from [`crate::assemble`].
    pub fn restore(
        id: OrderId,
        order_date: DateTime<Utc>,
        total: Money,
        items: Vec<OrderItem>,
    ) -> Self {
        Self {
            id,
            order_date,
            total,
            items,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
