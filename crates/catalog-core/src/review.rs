//! Reviews — one graded opinion per (user, product) while active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, lifecycle::Lifecycle, rating};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:    Uuid,
  pub user_id:      Uuid,
  pub product_id:   Uuid,
  pub comment:      String,
  /// Server-assigned; never changes after creation.
  pub comment_date: DateTime<Utc>,
  /// Integer grade in `1..=5`.
  pub grade:        u8,
  pub lifecycle:    Lifecycle,
}

/// Input to [`crate::store::CatalogStore::create_review`]. The author is not
/// part of the input; it is always the acting principal.
#[derive(Debug, Clone)]
pub struct NewReview {
  pub product_id: Uuid,
  pub comment:    String,
  pub grade:      u8,
}

impl NewReview {
  pub fn validate(&self) -> Result<()> { rating::check_grade(self.grade) }
}
