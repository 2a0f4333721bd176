//! [`Catalog`] — the intent-level API over a [`CatalogStore`].
//!
//! Each mutating method takes the acting [`Principal`], runs the
//! authorization gate, performs the field checks the core can detect, and
//! only then hands the write to the store. Reads are not gated.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  authz::{Action, Decision, authorize},
  category::{Category, NewCategory},
  lifecycle::EntityKind,
  product::{NewProduct, Product},
  review::{NewReview, Review},
  store::CatalogStore,
  user::{NewUser, Principal, User},
};

/// Lift a backend error into the core error kinds.
fn lift<E: Into<Error>>(err: E) -> Error { err.into() }

pub struct Catalog<S> {
  store: S,
}

impl<S: CatalogStore> Catalog<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  fn gate(principal: &Principal, action: Action) -> Result<()> {
    match authorize(principal, action) {
      Decision::Allow => Ok(()),
      Decision::Deny(reason) => {
        warn!(user_id = %principal.user_id, role = %principal.role, ?action, reason, "authorization denied");
        Err(Error::Forbidden(reason.to_owned()))
      }
    }
  }

  // ── Users ─────────────────────────────────────────────────────────────

  pub async fn register_user(&self, input: NewUser) -> Result<User> {
    let user = self.store.create_user(input).await.map_err(lift)?;
    info!(user_id = %user.user_id, role = %user.role, "user registered");
    Ok(user)
  }

  pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.store.get_user(id).await.map_err(lift)
  }

  pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self
      .store
      .find_user_by_email(email.to_owned())
      .await
      .map_err(lift)
  }

  pub async fn deactivate_user(&self, principal: &Principal, id: Uuid) -> Result<User> {
    Self::gate(principal, Action::DeactivateUser)?;
    let user = self.store.deactivate_user(id).await.map_err(lift)?;
    info!(user_id = %id, by = %principal.user_id, "user deactivated");
    Ok(user)
  }

  // ── Categories ────────────────────────────────────────────────────────

  pub async fn create_category(
    &self,
    principal: &Principal,
    input: NewCategory,
  ) -> Result<Category> {
    Self::gate(principal, Action::ManageCategory)?;
    let category = self.store.create_category(input).await.map_err(lift)?;
    info!(category_id = %category.category_id, "category created");
    Ok(category)
  }

  pub async fn update_category(
    &self,
    principal: &Principal,
    id: Uuid,
    input: NewCategory,
  ) -> Result<Category> {
    Self::gate(principal, Action::ManageCategory)?;
    let category = self.store.update_category(id, input).await.map_err(lift)?;
    info!(category_id = %id, "category updated");
    Ok(category)
  }

  pub async fn deactivate_category(
    &self,
    principal: &Principal,
    id: Uuid,
  ) -> Result<Category> {
    Self::gate(principal, Action::ManageCategory)?;
    let category = self.store.deactivate_category(id).await.map_err(lift)?;
    info!(category_id = %id, "category deactivated");
    Ok(category)
  }

  pub async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    self.store.get_category(id).await.map_err(lift)
  }

  pub async fn list_categories(&self) -> Result<Vec<Category>> {
    self.store.list_categories().await.map_err(lift)
  }

  // ── Products ──────────────────────────────────────────────────────────

  pub async fn create_product(
    &self,
    principal: &Principal,
    input: NewProduct,
  ) -> Result<Product> {
    Self::gate(principal, Action::ManageProduct)?;
    input.validate()?;
    let product = self.store.create_product(input).await.map_err(lift)?;
    info!(product_id = %product.product_id, "product created");
    Ok(product)
  }

  pub async fn update_product(
    &self,
    principal: &Principal,
    id: Uuid,
    input: NewProduct,
  ) -> Result<Product> {
    Self::gate(principal, Action::ManageProduct)?;
    input.validate()?;
    let product = self.store.update_product(id, input).await.map_err(lift)?;
    info!(product_id = %id, "product updated");
    Ok(product)
  }

  pub async fn deactivate_product(
    &self,
    principal: &Principal,
    id: Uuid,
  ) -> Result<Product> {
    Self::gate(principal, Action::ManageProduct)?;
    let product = self.store.deactivate_product(id).await.map_err(lift)?;
    info!(product_id = %id, "product deactivated");
    Ok(product)
  }

  pub async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.store.get_product(id).await.map_err(lift)
  }

  pub async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<Product>> {
    self.store.list_products(category_id).await.map_err(lift)
  }

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Post a review as `principal`. The review's author is always the
  /// principal.
  pub async fn create_review(
    &self,
    principal: &Principal,
    input: NewReview,
  ) -> Result<Review> {
    Self::gate(principal, Action::CreateReview)?;
    input.validate()?;
    let review = self
      .store
      .create_review(principal.user_id, input)
      .await
      .map_err(lift)?;
    info!(
      review_id = %review.review_id,
      product_id = %review.product_id,
      grade = review.grade,
      "review created"
    );
    Ok(review)
  }

  /// Deactivate a review. Roles that may never delete reviews are refused
  /// first; then a missing or inactive review is `NotFound`; then the
  /// author check runs.
  pub async fn deactivate_review(
    &self,
    principal: &Principal,
    id: Uuid,
  ) -> Result<Review> {
    Self::gate(principal, Action::DeleteReview { author: None })?;

    let existing = self
      .store
      .get_review(id)
      .await
      .map_err(lift)?
      .filter(|r| r.lifecycle.is_active())
      .ok_or_else(|| Error::not_found(EntityKind::Review, id))?;

    Self::gate(principal, Action::DeleteReview { author: Some(existing.user_id) })?;

    let review = self.store.deactivate_review(id).await.map_err(lift)?;
    info!(review_id = %id, product_id = %review.product_id, by = %principal.user_id, "review deactivated");
    Ok(review)
  }

  pub async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    self.store.get_review(id).await.map_err(lift)
  }

  pub async fn list_reviews(&self, product_id: Option<Uuid>) -> Result<Vec<Review>> {
    self.store.list_reviews(product_id).await.map_err(lift)
  }
}
