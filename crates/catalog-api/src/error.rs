//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use catalog_core::Error as CatalogError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Challenge sent with every 401.
pub const REALM: &str = "Basic realm=\"catalog\"";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthorized,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A server-side failure outside the store, such as password hashing.
  #[error("internal error: {0}")]
  Internal(String),
}

impl From<CatalogError> for ApiError {
  fn from(err: CatalogError) -> Self {
    let message = err.to_string();
    match err {
      CatalogError::NotFound { .. } => Self::NotFound(message),
      CatalogError::ReferenceInvalid { .. } | CatalogError::Validation(_) => {
        Self::BadRequest(message)
      }
      CatalogError::DuplicateReview { .. } | CatalogError::EmailTaken(_) => {
        Self::Conflict(message)
      }
      CatalogError::Forbidden(_) => Self::Forbidden(message),
      CatalogError::Storage(source) => Self::Store(source),
    }
  }
}

impl From<validator::ValidationErrors> for ApiError {
  fn from(err: validator::ValidationErrors) -> Self {
    Self::BadRequest(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal storage failure".to_owned())
      }
      ApiError::Internal(m) => {
        error!(error = %m, "internal failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    }
    res
  }
}
