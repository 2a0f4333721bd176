//! Handlers for `/categories` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/categories` | Active categories |
//! | `POST`   | `/categories` | Body: [`CategoryBody`]; returns 201 |
//! | `PUT`    | `/categories/:id` | Body: [`CategoryBody`]; full replace |
//! | `DELETE` | `/categories/:id` | Soft delete, no cascade |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use catalog_core::{
  category::{Category, NewCategory},
  service::Catalog,
  store::CatalogStore,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{auth::Authenticated, error::ApiError};

/// JSON body accepted by `POST /categories` and `PUT /categories/:id`.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryBody {
  #[validate(length(min = 3, max = 50, message = "name must be 3-50 characters"))]
  pub name:      String,
  pub parent_id: Option<Uuid>,
}

impl From<CategoryBody> for NewCategory {
  fn from(b: CategoryBody) -> Self {
    NewCategory { name: b.name, parent_id: b.parent_id }
  }
}

/// `GET /categories`
pub async fn list<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
  Ok(Json(catalog.list_categories().await?))
}

/// `POST /categories`
pub async fn create<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<CategoryBody>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let category = catalog.create_category(&principal, body.into()).await?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /categories/:id`
pub async fn update<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<CategoryBody>,
) -> Result<Json<Category>, ApiError> {
  body.validate()?;
  let category = catalog.update_category(&principal, id, body.into()).await?;
  Ok(Json(category))
}

/// `DELETE /categories/:id`
pub async fn deactivate<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
  Ok(Json(catalog.deactivate_category(&principal, id).await?))
}
