//! The `CatalogStore` trait.
//!
//! Implemented by storage backends (e.g. `catalog-store-sqlite`). Every write
//! method is one transaction: referential checks, uniqueness checks, the row
//! write and any rating recompute either all commit or all roll back.
//!
//! Authorization is not the store's concern; see [`crate::service::Catalog`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  category::{Category, NewCategory},
  lifecycle::EntityKind,
  product::{NewProduct, Product},
  review::{NewReview, Review},
  user::{NewUser, User},
};

/// Abstraction over a catalog store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  /// Backend error. Must convert into the core [`crate::Error`] so domain
  /// failures surface as their own kinds and everything else as
  /// [`crate::Error::Storage`].
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with `EmailTaken` if the email is in use.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user regardless of lifecycle.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn deactivate_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Categories ────────────────────────────────────────────────────────

  /// Fails with `ReferenceInvalid` if `parent_id` is set and not active.
  fn create_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Replace all mutable fields of an active category.
  fn update_category(
    &self,
    id: Uuid,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Retrieve a category regardless of lifecycle.
  fn get_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  /// All active categories.
  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  /// Does not cascade to child categories or products.
  fn deactivate_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  // ── Products ──────────────────────────────────────────────────────────

  /// Fails with `ReferenceInvalid` unless the category is active. The new
  /// product starts at the empty rating.
  fn create_product(
    &self,
    input: NewProduct,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Replace all mutable fields of an active product. The rating is kept.
  fn update_product(
    &self,
    id: Uuid,
    input: NewProduct,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Retrieve a product regardless of lifecycle.
  fn get_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// Active products, optionally restricted to one category.
  fn list_products(
    &self,
    category_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  /// Does not cascade to the product's reviews.
  fn deactivate_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Validate the user and product references, enforce one active review
  /// per (user, product), insert, and recompute the product rating, all in
  /// one transaction.
  fn create_review(
    &self,
    user_id: Uuid,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Retrieve a review regardless of lifecycle (deactivated reviews are kept
  /// for audit).
  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  /// Active reviews, optionally restricted to one product.
  fn list_reviews(
    &self,
    product_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// Deactivate an active review and recompute its product's rating in the
  /// same transaction.
  fn deactivate_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// Recompute and persist a product's rating from its active reviews.
  fn recompute_rating(
    &self,
    product_id: Uuid,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;

  // ── Generic ───────────────────────────────────────────────────────────

  /// Deactivate any entity by kind. A missing or already inactive target is
  /// reported as `NotFound`.
  fn deactivate(
    &self,
    kind: EntityKind,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    async move {
      match kind {
        EntityKind::Category => self.deactivate_category(id).await.map(drop),
        EntityKind::Product => self.deactivate_product(id).await.map(drop),
        EntityKind::Review => self.deactivate_review(id).await.map(drop),
        EntityKind::User => self.deactivate_user(id).await.map(drop),
      }
    }
  }
}
