//! Authorization gate.
//!
//! A pure function of the principal and the intended action. Nothing is
//! cached between calls; every mutation is decided afresh.

use uuid::Uuid;

use crate::user::{Principal, Role};

/// A mutating intent that must pass the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  CreateReview,
  /// Deactivate a review written by `author`. `None` asks whether the role
  /// may delete reviews at all, before the review has been looked up.
  DeleteReview { author: Option<Uuid> },
  /// Create, update, or deactivate a category.
  ManageCategory,
  /// Create, update, or deactivate a product.
  ManageProduct,
  DeactivateUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny(&'static str),
}

impl Decision {
  pub fn is_allowed(self) -> bool { matches!(self, Self::Allow) }
}

pub fn authorize(principal: &Principal, action: Action) -> Decision {
  match action {
    Action::CreateReview => {
      if principal.role != Role::Buyer {
        Decision::Deny("only buyers may post reviews")
      } else if !principal.is_active() {
        Decision::Deny("inactive users may not post reviews")
      } else {
        Decision::Allow
      }
    }
    Action::DeleteReview { author } => match (principal.role, author) {
      (Role::Admin, _) | (Role::Buyer, None) => Decision::Allow,
      (Role::Buyer, Some(author)) if principal.user_id == author => Decision::Allow,
      _ => Decision::Deny("only the review author or an admin may delete it"),
    },
    Action::ManageCategory | Action::DeactivateUser => {
      if principal.role == Role::Admin && principal.is_active() {
        Decision::Allow
      } else {
        Decision::Deny("admin role required")
      }
    }
    Action::ManageProduct => {
      let permitted = matches!(principal.role, Role::Seller | Role::Admin);
      if permitted && principal.is_active() {
        Decision::Allow
      } else {
        Decision::Deny("seller or admin role required")
      }
    }
  }
}
