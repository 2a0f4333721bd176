//! Error types for `catalog-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  /// The target record does not exist, or is inactive where an active record
  /// is required.
  #[error("{kind} not found or inactive: {id}")]
  NotFound { kind: EntityKind, id: Uuid },

  /// A foreign reference points at a missing or inactive record.
  #[error("referenced {kind} is missing or inactive: {id}")]
  ReferenceInvalid { kind: EntityKind, id: Uuid },

  #[error("user {user_id} already has an active review for product {product_id}")]
  DuplicateReview { user_id: Uuid, product_id: Uuid },

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("validation failed: {0}")]
  Validation(String),

  /// The underlying store failed. The enclosing transaction has already been
  /// rolled back when this is returned.
  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
    Self::NotFound { kind, id }
  }

  pub fn reference_invalid(kind: EntityKind, id: Uuid) -> Self {
    Self::ReferenceInvalid { kind, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
