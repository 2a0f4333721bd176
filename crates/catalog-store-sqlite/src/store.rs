//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use catalog_core::{
  category::{Category, NewCategory},
  lifecycle::Lifecycle,
  product::{NewProduct, Product},
  rating::EMPTY_RATING,
  review::{NewReview, Review},
  store::CatalogStore,
  user::{NewUser, User},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    CATEGORY_COLUMNS, PRODUCT_COLUMNS, REVIEW_COLUMNS, RawCategory, RawProduct,
    RawReview, encode_uuid,
  },
  schema::SCHEMA,
  script,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// statements run on the connection's dedicated thread, and every write is
/// one closure on that thread, so a dropped request future can never leave a
/// transaction half applied: the closure runs to commit or rollback.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a store backed by a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a write script on the connection thread.
  async fn write<T, F>(&self, script: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(script(conn))).await?
  }

  /// Run a read on the connection thread.
  async fn read<T, F>(&self, query: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(query(conn))).await?
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      email:         input.email,
      password_hash: input.password_hash,
      role:          input.role,
      lifecycle:     Lifecycle::Active,
    };
    self.write(move |conn| script::insert_user(conn, user)).await
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.read(move |conn| script::select_user(conn, id)).await
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<User>> {
    self
      .read(move |conn| script::select_user_by_email(conn, &email))
      .await
  }

  async fn deactivate_user(&self, id: Uuid) -> Result<User> {
    self.write(move |conn| script::deactivate_user(conn, id)).await
  }

  // ── Categories ────────────────────────────────────────────────────────────

  async fn create_category(&self, input: NewCategory) -> Result<Category> {
    let category = Category {
      category_id: Uuid::new_v4(),
      name:        input.name,
      parent_id:   input.parent_id,
      lifecycle:   Lifecycle::Active,
    };
    self
      .write(move |conn| script::insert_category(conn, category))
      .await
  }

  async fn update_category(&self, id: Uuid, input: NewCategory) -> Result<Category> {
    self
      .write(move |conn| script::update_category(conn, id, input))
      .await
  }

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    self.read(move |conn| script::select_category(conn, id)).await
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let raws: Vec<RawCategory> = self
      .read(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CATEGORY_COLUMNS} FROM categories WHERE active = 1 ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], RawCategory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  async fn deactivate_category(&self, id: Uuid) -> Result<Category> {
    self
      .write(move |conn| script::deactivate_category(conn, id))
      .await
  }

  // ── Products ──────────────────────────────────────────────────────────────

  async fn create_product(&self, input: NewProduct) -> Result<Product> {
    let product = Product {
      product_id:  Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      price:       input.price,
      image_url:   input.image_url,
      stock:       input.stock,
      category_id: input.category_id,
      lifecycle:   Lifecycle::Active,
      rating:      EMPTY_RATING,
    };
    self
      .write(move |conn| script::insert_product(conn, product))
      .await
  }

  async fn update_product(&self, id: Uuid, input: NewProduct) -> Result<Product> {
    self
      .write(move |conn| script::update_product(conn, id, input))
      .await
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.read(move |conn| script::select_product(conn, id)).await
  }

  async fn list_products(&self, category_id: Option<Uuid>) -> Result<Vec<Product>> {
    let category_str = category_id.map(encode_uuid);

    let raws: Vec<RawProduct> = self
      .read(move |conn| {
        let rows = if let Some(c) = category_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
              WHERE active = 1 AND category_id = ?1 ORDER BY name"
          ))?;
          stmt
            .query_map(rusqlite::params![c], RawProduct::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE active = 1 ORDER BY name"
          ))?;
          stmt
            .query_map([], RawProduct::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  async fn deactivate_product(&self, id: Uuid) -> Result<Product> {
    self
      .write(move |conn| script::deactivate_product(conn, id))
      .await
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn create_review(&self, user_id: Uuid, input: NewReview) -> Result<Review> {
    let review = Review {
      review_id: Uuid::new_v4(),
      user_id,
      product_id: input.product_id,
      comment: input.comment,
      comment_date: Utc::now(),
      grade: input.grade,
      lifecycle: Lifecycle::Active,
    };
    self.write(move |conn| script::insert_review(conn, review)).await
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<Review>> {
    self.read(move |conn| script::select_review(conn, id)).await
  }

  async fn list_reviews(&self, product_id: Option<Uuid>) -> Result<Vec<Review>> {
    let product_str = product_id.map(encode_uuid);

    let raws: Vec<RawReview> = self
      .read(move |conn| {
        let rows = if let Some(p) = product_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
              WHERE active = 1 AND product_id = ?1 ORDER BY comment_date"
          ))?;
          stmt
            .query_map(rusqlite::params![p], RawReview::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE active = 1 ORDER BY comment_date"
          ))?;
          stmt
            .query_map([], RawReview::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn deactivate_review(&self, id: Uuid) -> Result<Review> {
    self
      .write(move |conn| script::deactivate_review(conn, id))
      .await
  }

  async fn recompute_rating(&self, product_id: Uuid) -> Result<f64> {
    self
      .write(move |conn| script::recompute_rating(conn, product_id))
      .await
  }
}
