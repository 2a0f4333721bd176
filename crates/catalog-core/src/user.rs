//! Users, roles, and the authenticated principal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::Lifecycle;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Buyer,
  Seller,
  Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub email:         String,
  /// Argon2 PHC string. Never serialised into responses.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  /// Fixed at registration.
  pub role:          Role,
  pub lifecycle:     Lifecycle,
}

/// Input to [`crate::store::CatalogStore::create_user`]. The password must
/// already be hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
}

/// The identity on whose behalf an operation is attempted. Produced by an
/// authentication layer; the core only consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
  pub user_id:   Uuid,
  pub role:      Role,
  pub lifecycle: Lifecycle,
}

impl Principal {
  pub fn is_active(&self) -> bool { self.lifecycle.is_active() }
}

impl From<&User> for Principal {
  fn from(user: &User) -> Self {
    Self {
      user_id:   user.user_id,
      role:      user.role,
      lifecycle: user.lifecycle,
    }
  }
}
