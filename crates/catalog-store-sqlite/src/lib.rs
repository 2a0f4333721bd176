//! SQLite backend for the catalog store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every write is a transaction script
//! executed as a single closure on that thread.

mod encode;
mod schema;
mod script;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
