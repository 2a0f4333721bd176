//! Categories — a single-parent hierarchy of product groupings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::Lifecycle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub category_id: Uuid,
  pub name:        String,
  /// Parent category. Must name an active category at write time; the tree
  /// is not checked for cycles beyond this single lookup.
  pub parent_id:   Option<Uuid>,
  pub lifecycle:   Lifecycle,
}

/// Input to [`crate::store::CatalogStore::create_category`] and
/// [`crate::store::CatalogStore::update_category`]. Updates replace every
/// mutable field.
#[derive(Debug, Clone)]
pub struct NewCategory {
  pub name:      String,
  pub parent_id: Option<Uuid>,
}
