//! Soft-delete lifecycle shared by every catalog entity.
//!
//! Nothing in the catalog is ever physically removed. A record is either
//! `Active` or `Inactive`; deactivation is a one-way transition.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
  #[default]
  Active,
  Inactive,
}

impl Lifecycle {
  pub fn is_active(self) -> bool { matches!(self, Self::Active) }
}

/// The kinds of entity held by a catalog store.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Category,
  Product,
  Review,
  User,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_active() {
    assert!(Lifecycle::default().is_active());
    assert!(!Lifecycle::Inactive.is_active());
  }

  #[test]
  fn entity_kind_displays_snake_case() {
    assert_eq!(EntityKind::Product.to_string(), "product");
    assert_eq!(EntityKind::User.to_string(), "user");
  }
}
