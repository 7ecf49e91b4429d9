//! Orders domain module.
//!
//! The `Order` aggregate, its owned line items, and the pure part of order
//! assembly: resolving requested lines against fetched products and computing
//! the snapshotted total. Fetching products and persisting orders live in
//! `storefront-infra`.

pub mod assembly;
pub mod order;

pub use assembly::{assemble, distinct_product_ids, validate_lines, OrderError};
pub use order::{Order, OrderItem, OrderLineRequest};
