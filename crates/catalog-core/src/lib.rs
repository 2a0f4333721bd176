//! Core types and trait definitions for the catalog consistency engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::CatalogStore`]; the [`service::Catalog`]
//! orchestrates authorization in front of them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod authz;
pub mod category;
pub mod error;
pub mod lifecycle;
pub mod product;
pub mod rating;
pub mod review;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, Result};
