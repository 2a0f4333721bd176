//! Handlers for `/products` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/products` | Active products; optional `?category_id` |
//! | `GET`    | `/products/:id` | Active product, else 404 |
//! | `POST`   | `/products` | Body: [`ProductBody`]; returns 201 |
//! | `PUT`    | `/products/:id` | Body: [`ProductBody`]; rating is kept |
//! | `DELETE` | `/products/:id` | Soft delete |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use catalog_core::{
  lifecycle::EntityKind,
  product::{NewProduct, Product},
  service::Catalog,
  store::CatalogStore,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{auth::Authenticated, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to products in this category.
  pub category_id: Option<Uuid>,
}

/// `GET /products[?category_id=<id>]`
pub async fn list<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
  Ok(Json(catalog.list_products(params.category_id).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /products/:id`
pub async fn get_one<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
  let product = catalog
    .get_product(id)
    .await?
    .filter(|p| p.lifecycle.is_active())
    .ok_or_else(|| catalog_core::Error::not_found(EntityKind::Product, id))?;
  Ok(Json(product))
}

// ─── Create / update ──────────────────────────────────────────────────────────

/// JSON body accepted by `POST /products` and `PUT /products/:id`.
///
/// Price scale is checked by the catalog itself.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductBody {
  #[validate(length(min = 3, max = 100, message = "name must be 3-100 characters"))]
  pub name:        String,
  #[validate(length(max = 500, message = "description must be at most 500 characters"))]
  pub description: Option<String>,
  pub price:       Decimal,
  #[validate(length(max = 200, message = "image_url must be at most 200 characters"))]
  pub image_url:   Option<String>,
  pub stock:       u32,
  pub category_id: Uuid,
}

impl From<ProductBody> for NewProduct {
  fn from(b: ProductBody) -> Self {
    NewProduct {
      name:        b.name,
      description: b.description,
      price:       b.price,
      image_url:   b.image_url,
      stock:       b.stock,
      category_id: b.category_id,
    }
  }
}

/// `POST /products`
pub async fn create<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<ProductBody>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let product = catalog.create_product(&principal, body.into()).await?;
  Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/:id`
pub async fn update<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<ProductBody>,
) -> Result<Json<Product>, ApiError> {
  body.validate()?;
  Ok(Json(catalog.update_product(&principal, id, body.into()).await?))
}

// ─── Deactivate ──────────────────────────────────────────────────────────────

/// `DELETE /products/:id`
pub async fn deactivate<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
  Ok(Json(catalog.deactivate_product(&principal, id).await?))
}
