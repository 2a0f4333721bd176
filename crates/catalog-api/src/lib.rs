//! JSON REST API for the catalog.
//!
//! Exposes an axum [`Router`] backed by a [`Catalog`] over any
//! [`CatalogStore`]. Mutating routes require HTTP Basic credentials; the
//! [`auth::Authenticated`] extractor turns them into a
//! [`Principal`](catalog_core::user::Principal) which the catalog's
//! authorization gate then judges. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", catalog_api::api_router(catalog.clone()))
//! ```

pub mod auth;
pub mod categories;
pub mod error;
pub mod products;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use catalog_core::{service::Catalog, store::CatalogStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(catalog: Arc<Catalog<S>>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::register::<S>))
    .route("/users/{id}", delete(users::deactivate::<S>))
    // Categories
    .route(
      "/categories",
      get(categories::list::<S>).post(categories::create::<S>),
    )
    .route(
      "/categories/{id}",
      put(categories::update::<S>).delete(categories::deactivate::<S>),
    )
    // Products
    .route("/products", get(products::list::<S>).post(products::create::<S>))
    .route(
      "/products/{id}",
      get(products::get_one::<S>)
        .put(products::update::<S>)
        .delete(products::deactivate::<S>),
    )
    .route("/products/{id}/reviews", get(reviews::for_product::<S>))
    // Reviews
    .route("/reviews", get(reviews::list::<S>).post(reviews::create::<S>))
    .route(
      "/reviews/{id}",
      get(reviews::get_one::<S>).delete(reviews::deactivate::<S>),
    )
    .with_state(catalog)
}

#[cfg(test)]
mod tests;
