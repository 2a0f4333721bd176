//! Handlers for `/reviews` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/reviews` | All active reviews |
//! | `GET`    | `/products/:id/reviews` | Active reviews of one product |
//! | `GET`    | `/reviews/:id` | Any review, inactive included |
//! | `POST`   | `/reviews` | Body: [`ReviewBody`]; author is the caller |
//! | `DELETE` | `/reviews/:id` | Author or admin |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use catalog_core::{
  lifecycle::EntityKind,
  review::{NewReview, Review},
  service::Catalog,
  store::CatalogStore,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{auth::Authenticated, error::ApiError};

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /reviews`
pub async fn list<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
) -> Result<Json<Vec<Review>>, ApiError> {
  Ok(Json(catalog.list_reviews(None).await?))
}

/// `GET /products/:id/reviews`
pub async fn for_product<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError> {
  Ok(Json(catalog.list_reviews(Some(product_id)).await?))
}

/// `GET /reviews/:id`
pub async fn get_one<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError> {
  let review = catalog
    .get_review(id)
    .await?
    .ok_or_else(|| catalog_core::Error::not_found(EntityKind::Review, id))?;
  Ok(Json(review))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /reviews`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewBody {
  pub product_id: Uuid,
  #[validate(length(min = 1, message = "comment is required"))]
  pub comment:    String,
  #[validate(range(min = 1, max = 5, message = "grade must be 1-5"))]
  pub grade:      u8,
}

impl From<ReviewBody> for NewReview {
  fn from(b: ReviewBody) -> Self {
    NewReview { product_id: b.product_id, comment: b.comment, grade: b.grade }
  }
}

/// `POST /reviews` — returns 201 + the stored review.
pub async fn create<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Json(body): Json<ReviewBody>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let review = catalog.create_review(&principal, body.into()).await?;
  Ok((StatusCode::CREATED, Json(review)))
}

// ─── Deactivate ──────────────────────────────────────────────────────────────

/// `DELETE /reviews/:id`
pub async fn deactivate<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError> {
  Ok(Json(catalog.deactivate_review(&principal, id).await?))
}
