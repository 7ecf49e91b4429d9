use serde::Deserialize;

use storefront_core::Money;
use storefront_orders::OrderLineRequest;
use storefront_products::NewProduct;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Money,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        NewProduct::new(req.name, req.price)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

/// `?ids=a,b,c`; a missing parameter means an empty batch.
#[derive(Debug, Deserialize)]
pub struct ProductIdsQuery {
    pub ids: Option<String>,
}
