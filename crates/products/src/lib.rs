//! Products domain module.
//!
//! This crate contains the catalog record and its creation rules, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{NewProduct, Product};
