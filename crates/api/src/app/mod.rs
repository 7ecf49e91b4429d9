//! HTTP application wiring (Axum routers + service wiring).
//!
//! - `services.rs`: infrastructure wiring (stores, product catalog client, assembler)
//! - `routes/`: HTTP routes + handlers (one file per service)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{OrderServices, ProductServices};

/// Router for the product service.
pub fn build_product_app(services: Arc<ProductServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/products", routes::products::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(services)),
        )
}

/// Router for the order service.
pub fn build_order_app(services: Arc<OrderServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/orders", routes::orders::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(services)),
        )
}
