//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: [`RegisterBody`]; open registration for buyers and sellers |
//! | `DELETE` | `/users/:id` | Admin only; soft delete |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use catalog_core::{
  service::Catalog,
  store::CatalogStore,
  user::{NewUser, Role, User},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
  auth::{Authenticated, hash_password},
  error::ApiError,
};

// ─── Register ────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
  #[validate(email(message = "invalid email format"))]
  pub email:    String,
  #[validate(length(min = 8, message = "password must be at least 8 characters"))]
  pub password: String,
  pub role:     Role,
}

/// `POST /users` — returns 201 + the stored user, without its hash.
///
/// Admin accounts are never created here; the server provisions them.
pub async fn register<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  if body.role == Role::Admin {
    return Err(ApiError::BadRequest(
      "role must be buyer or seller".to_owned(),
    ));
  }

  let user = catalog
    .register_user(NewUser {
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      role:          body.role,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Deactivate ──────────────────────────────────────────────────────────────

/// `DELETE /users/:id`
pub async fn deactivate<S: CatalogStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Authenticated(principal): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
  let user = catalog.deactivate_user(&principal, id).await?;
  Ok(Json(user))
}
