//! Transaction scripts.
//!
//! Each public function here runs on the `tokio_rusqlite` connection thread
//! and performs one logical write as a single `BEGIN IMMEDIATE` transaction:
//! reference validation, uniqueness checks, the row write, and any rating
//! recompute. An early return drops the [`Transaction`], which rolls it back,
//! so no partial write is ever committed.

use catalog_core::{
  Error as CatalogError,
  category::{Category, NewCategory},
  lifecycle::{EntityKind, Lifecycle},
  product::{NewProduct, Product},
  rating,
  review::Review,
  user::User,
};
use rusqlite::{
  Connection, ErrorCode, OptionalExtension as _, Transaction, TransactionBehavior,
  ffi, params,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    CATEGORY_COLUMNS, PRODUCT_COLUMNS, REVIEW_COLUMNS, RawCategory, RawProduct,
    RawReview, RawUser, USER_COLUMNS, encode_dt, encode_lifecycle, encode_price,
    encode_role, encode_uuid,
  },
};

// ─── Transaction boundary ────────────────────────────────────────────────────

/// Run `script` inside an immediate transaction and commit it.
///
/// Taking the write lock up front serialises concurrent writers, so two
/// rating recomputes for the same product can never interleave. If the lock
/// is busy at `BEGIN` (nothing has been written yet) the begin is retried
/// once; nothing is retried after the script has started.
pub fn write_tx<T>(
  conn: &mut Connection,
  script: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
  match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
    Ok(tx) => return finish(tx, script),
    Err(e) if is_busy(&e) => debug!("write lock busy at begin; retrying once"),
    Err(e) => return Err(e.into()),
  }
  finish(
    conn.transaction_with_behavior(TransactionBehavior::Immediate)?,
    script,
  )
}

/// Run the script and commit. An error drops `tx`, rolling it back.
fn finish<T>(
  tx: Transaction<'_>,
  script: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
  let value = script(&tx)?;
  tx.commit()?;
  Ok(value)
}

fn is_busy(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
  )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Referential validator ───────────────────────────────────────────────────

fn lifecycle_sql(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Category => "SELECT active FROM categories WHERE category_id = ?1",
    EntityKind::Product => "SELECT active FROM products WHERE product_id = ?1",
    EntityKind::Review => "SELECT active FROM reviews WHERE review_id = ?1",
    EntityKind::User => "SELECT active FROM users WHERE user_id = ?1",
  }
}

/// Lifecycle of a record, or `None` if no such row exists.
fn lifecycle_of(conn: &Connection, kind: EntityKind, id: Uuid) -> Result<Option<Lifecycle>> {
  let active: Option<bool> = conn
    .query_row(lifecycle_sql(kind), params![encode_uuid(id)], |r| r.get(0))
    .optional()?;
  Ok(active.map(crate::encode::decode_lifecycle))
}

/// Require `id` to name an existing, active `kind`. Anything else is
/// `ReferenceInvalid`.
///
/// `Ok(())` is the found case. Callers that need the record read it inside
/// the same transaction.
pub fn validate_reference(conn: &Connection, kind: EntityKind, id: Uuid) -> Result<()> {
  match lifecycle_of(conn, kind, id)? {
    Some(Lifecycle::Active) => Ok(()),
    Some(Lifecycle::Inactive) | None => {
      warn!(%kind, %id, "rejected write: reference missing or inactive");
      Err(CatalogError::reference_invalid(kind, id).into())
    }
  }
}

/// Require the target of an update or deactivation to be active. Anything
/// else is `NotFound`.
fn require_active(conn: &Connection, kind: EntityKind, id: Uuid) -> Result<()> {
  match lifecycle_of(conn, kind, id)? {
    Some(Lifecycle::Active) => Ok(()),
    _ => Err(CatalogError::not_found(kind, id).into()),
  }
}

// ─── Row reads ───────────────────────────────────────────────────────────────

pub fn select_user(conn: &Connection, id: Uuid) -> Result<Option<User>> {
  let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(id)], RawUser::from_row)
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

pub fn select_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
  let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
  let raw = conn
    .query_row(&sql, params![email], RawUser::from_row)
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

pub fn select_category(conn: &Connection, id: Uuid) -> Result<Option<Category>> {
  let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE category_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(id)], RawCategory::from_row)
    .optional()?;
  raw.map(RawCategory::into_category).transpose()
}

pub fn select_product(conn: &Connection, id: Uuid) -> Result<Option<Product>> {
  let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(id)], RawProduct::from_row)
    .optional()?;
  raw.map(RawProduct::into_product).transpose()
}

pub fn select_review(conn: &Connection, id: Uuid) -> Result<Option<Review>> {
  let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(id)], RawReview::from_row)
    .optional()?;
  raw.map(RawReview::into_review).transpose()
}

/// Re-read a row that the current transaction has just written.
fn reread<T>(
  found: Option<T>,
  kind: EntityKind,
  id: Uuid,
) -> Result<T> {
  found.ok_or_else(|| CatalogError::not_found(kind, id).into())
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn insert_user(conn: &mut Connection, user: User) -> Result<User> {
  write_tx(conn, |tx| {
    let inserted = tx.execute(
      "INSERT INTO users (user_id, email, password_hash, role, active)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      params![
        encode_uuid(user.user_id),
        user.email,
        user.password_hash,
        encode_role(user.role),
        encode_lifecycle(user.lifecycle),
      ],
    );
    match inserted {
      Ok(_) => Ok(user),
      Err(e) if is_unique_violation(&e) => {
        Err(CatalogError::EmailTaken(user.email.clone()).into())
      }
      Err(e) => Err(e.into()),
    }
  })
}

// ─── Categories ──────────────────────────────────────────────────────────────

pub fn insert_category(conn: &mut Connection, category: Category) -> Result<Category> {
  write_tx(conn, |tx| {
    if let Some(parent_id) = category.parent_id {
      validate_reference(tx, EntityKind::Category, parent_id)?;
    }
    tx.execute(
      "INSERT INTO categories (category_id, name, parent_id, active)
       VALUES (?1, ?2, ?3, ?4)",
      params![
        encode_uuid(category.category_id),
        category.name,
        category.parent_id.map(encode_uuid),
        encode_lifecycle(category.lifecycle),
      ],
    )?;
    Ok(category)
  })
}

pub fn update_category(
  conn: &mut Connection,
  id: Uuid,
  input: NewCategory,
) -> Result<Category> {
  write_tx(conn, |tx| {
    require_active(tx, EntityKind::Category, id)?;
    if let Some(parent_id) = input.parent_id {
      if parent_id == id {
        return Err(CatalogError::reference_invalid(EntityKind::Category, parent_id).into());
      }
      validate_reference(tx, EntityKind::Category, parent_id)?;
    }
    tx.execute(
      "UPDATE categories SET name = ?2, parent_id = ?3 WHERE category_id = ?1",
      params![encode_uuid(id), input.name, input.parent_id.map(encode_uuid)],
    )?;
    reread(select_category(tx, id)?, EntityKind::Category, id)
  })
}

// ─── Products ────────────────────────────────────────────────────────────────

pub fn insert_product(conn: &mut Connection, product: Product) -> Result<Product> {
  write_tx(conn, |tx| {
    validate_reference(tx, EntityKind::Category, product.category_id)?;
    tx.execute(
      "INSERT INTO products (
         product_id, name, description, price, image_url,
         stock, category_id, active, rating
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      params![
        encode_uuid(product.product_id),
        product.name,
        product.description,
        encode_price(product.price),
        product.image_url,
        product.stock,
        encode_uuid(product.category_id),
        encode_lifecycle(product.lifecycle),
        product.rating,
      ],
    )?;
    Ok(product)
  })
}

pub fn update_product(
  conn: &mut Connection,
  id: Uuid,
  input: NewProduct,
) -> Result<Product> {
  write_tx(conn, |tx| {
    require_active(tx, EntityKind::Product, id)?;
    validate_reference(tx, EntityKind::Category, input.category_id)?;
    tx.execute(
      "UPDATE products
          SET name = ?2, description = ?3, price = ?4, image_url = ?5,
              stock = ?6, category_id = ?7
        WHERE product_id = ?1",
      params![
        encode_uuid(id),
        input.name,
        input.description,
        encode_price(input.price),
        input.image_url,
        input.stock,
        encode_uuid(input.category_id),
      ],
    )?;
    reread(select_product(tx, id)?, EntityKind::Product, id)
  })
}

// ─── Rating aggregator ───────────────────────────────────────────────────────

/// Recompute a product's rating from its active reviews and persist it.
///
/// Must be called inside the transaction that changed the active review set.
fn recompute_rating_in(tx: &Transaction<'_>, product_id: Uuid) -> Result<f64> {
  let id_str = encode_uuid(product_id);
  let grades = {
    let mut stmt = tx.prepare_cached(
      "SELECT grade FROM reviews WHERE product_id = ?1 AND active = 1",
    )?;
    stmt
      .query_map(params![id_str], |r| r.get::<_, u8>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let value = rating::average(&grades);
  let updated = tx.execute(
    "UPDATE products SET rating = ?2 WHERE product_id = ?1",
    params![id_str, value],
  )?;
  if updated == 0 {
    return Err(CatalogError::not_found(EntityKind::Product, product_id).into());
  }
  debug!(%product_id, reviews = grades.len(), rating = value, "rating recomputed");
  Ok(value)
}

pub fn recompute_rating(conn: &mut Connection, product_id: Uuid) -> Result<f64> {
  write_tx(conn, |tx| recompute_rating_in(tx, product_id))
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

fn active_review_exists(tx: &Transaction<'_>, user_id: Uuid, product_id: Uuid) -> Result<bool> {
  let found = tx
    .query_row(
      "SELECT 1 FROM reviews WHERE user_id = ?1 AND product_id = ?2 AND active = 1",
      params![encode_uuid(user_id), encode_uuid(product_id)],
      |_| Ok(true),
    )
    .optional()?;
  Ok(found.unwrap_or(false))
}

fn duplicate_review(review: &Review) -> CatalogError {
  CatalogError::DuplicateReview {
    user_id:    review.user_id,
    product_id: review.product_id,
  }
}

/// Insert the review row. A violation of the partial unique index is the
/// authoritative duplicate signal and surfaces as `DuplicateReview`.
fn insert_review_row(tx: &Transaction<'_>, review: &Review) -> Result<()> {
  let inserted = tx.execute(
    "INSERT INTO reviews (
       review_id, user_id, product_id, comment, comment_date, grade, active
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(review.review_id),
      encode_uuid(review.user_id),
      encode_uuid(review.product_id),
      review.comment,
      encode_dt(review.comment_date),
      review.grade,
      encode_lifecycle(review.lifecycle),
    ],
  );
  match inserted {
    Ok(_) => Ok(()),
    Err(e) if is_unique_violation(&e) => Err(duplicate_review(review).into()),
    Err(e) => Err(e.into()),
  }
}

/// validate references → uniqueness guard → insert → rating recompute.
pub fn insert_review(conn: &mut Connection, review: Review) -> Result<Review> {
  write_tx(conn, |tx| {
    validate_reference(tx, EntityKind::User, review.user_id)?;
    validate_reference(tx, EntityKind::Product, review.product_id)?;

    if active_review_exists(tx, review.user_id, review.product_id)? {
      return Err(duplicate_review(&review).into());
    }
    insert_review_row(tx, &review)?;

    recompute_rating_in(tx, review.product_id)?;
    Ok(review)
  })
}

// ─── Soft-delete coordinator ─────────────────────────────────────────────────

fn deactivate_sql(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Category => {
      "UPDATE categories SET active = 0 WHERE category_id = ?1 AND active = 1"
    }
    EntityKind::Product => {
      "UPDATE products SET active = 0 WHERE product_id = ?1 AND active = 1"
    }
    EntityKind::Review => {
      "UPDATE reviews SET active = 0 WHERE review_id = ?1 AND active = 1"
    }
    EntityKind::User => "UPDATE users SET active = 0 WHERE user_id = ?1 AND active = 1",
  }
}

/// Flip `active` off. A missing or already inactive row is `NotFound`.
fn flip_inactive(tx: &Transaction<'_>, kind: EntityKind, id: Uuid) -> Result<()> {
  let changed = tx.execute(deactivate_sql(kind), params![encode_uuid(id)])?;
  if changed == 0 {
    return Err(CatalogError::not_found(kind, id).into());
  }
  Ok(())
}

pub fn deactivate_user(conn: &mut Connection, id: Uuid) -> Result<User> {
  write_tx(conn, |tx| {
    flip_inactive(tx, EntityKind::User, id)?;
    reread(select_user(tx, id)?, EntityKind::User, id)
  })
}

/// Children and products of the category are left untouched.
pub fn deactivate_category(conn: &mut Connection, id: Uuid) -> Result<Category> {
  write_tx(conn, |tx| {
    flip_inactive(tx, EntityKind::Category, id)?;
    reread(select_category(tx, id)?, EntityKind::Category, id)
  })
}

/// The product's reviews and rating are left untouched.
pub fn deactivate_product(conn: &mut Connection, id: Uuid) -> Result<Product> {
  write_tx(conn, |tx| {
    flip_inactive(tx, EntityKind::Product, id)?;
    reread(select_product(tx, id)?, EntityKind::Product, id)
  })
}

/// Deactivate a review and recompute its product's rating in the same
/// transaction.
pub fn deactivate_review(conn: &mut Connection, id: Uuid) -> Result<Review> {
  write_tx(conn, |tx| {
    flip_inactive(tx, EntityKind::Review, id)?;
    let review = reread(select_review(tx, id)?, EntityKind::Review, id)?;
    recompute_rating_in(tx, review.product_id)?;
    Ok(review)
  })
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::schema::SCHEMA;

  fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn
      .execute_batch(
        "INSERT INTO users VALUES ('u', 'u@example.com', 'h', 'buyer', 1);
         INSERT INTO categories VALUES ('c', 'Kitchen', NULL, 1);
         INSERT INTO products VALUES ('p', 'Pan', NULL, '10.00', NULL, 1, 'c', 1, 0);",
      )
      .unwrap();
    conn
  }

  fn insert_raw(conn: &Connection, id: &str, active: bool) -> rusqlite::Result<usize> {
    conn.execute(
      "INSERT INTO reviews VALUES (?1, 'u', 'p', 'ok', '2024-01-01T00:00:00Z', 4, ?2)",
      params![id, active],
    )
  }

  #[test]
  fn partial_index_rejects_second_active_review() {
    let conn = conn();
    insert_raw(&conn, "r1", true).unwrap();
    let err = insert_raw(&conn, "r2", true).unwrap_err();
    assert!(is_unique_violation(&err));
  }

  #[test]
  fn partial_index_ignores_inactive_reviews() {
    let conn = conn();
    insert_raw(&conn, "r1", false).unwrap();
    insert_raw(&conn, "r2", false).unwrap();
    insert_raw(&conn, "r3", true).unwrap();
  }

  #[test]
  fn failed_script_rolls_back() {
    let mut conn = conn();
    let result: Result<()> = write_tx(&mut conn, |tx| {
      tx.execute("UPDATE products SET rating = 5 WHERE product_id = 'p'", [])?;
      Err(CatalogError::Validation("late failure".into()).into())
    });
    assert!(result.is_err());

    let rating: f64 = conn
      .query_row("SELECT rating FROM products WHERE product_id = 'p'", [], |r| r.get(0))
      .unwrap();
    assert_eq!(rating, 0.0);
  }

  // ── Uniqueness guard ──────────────────────────────────────────────────────

  fn active_review(user_id: Uuid, product_id: Uuid) -> Review {
    Review {
      review_id: Uuid::new_v4(),
      user_id,
      product_id,
      comment: "fine".into(),
      comment_date: chrono::Utc::now(),
      grade: 3,
      lifecycle: Lifecycle::Active,
    }
  }

  #[test]
  fn index_violation_surfaces_as_duplicate_review() {
    let mut conn = conn();
    let user_id = Uuid::new_v4();
    let product_id = Uuid::new_v4();
    conn
      .execute_batch(&format!(
        "INSERT INTO users VALUES ('{user_id}', 'v@example.com', 'h', 'buyer', 1);
         INSERT INTO products VALUES ('{product_id}', 'Pot', NULL, '5.00', NULL, 1, 'c', 1, 0);"
      ))
      .unwrap();
    insert_review(&mut conn, active_review(user_id, product_id)).unwrap();

    // Skip the pre-check so the insert itself hits the partial index.
    let second = active_review(user_id, product_id);
    let err = write_tx(&mut conn, |tx| insert_review_row(tx, &second)).unwrap_err();
    assert!(matches!(
      err,
      crate::Error::Catalog(CatalogError::DuplicateReview { user_id: u, product_id: p })
        if u == user_id && p == product_id
    ));

    let rows: i64 = conn
      .query_row("SELECT COUNT(*) FROM reviews WHERE active = 1", [], |r| r.get(0))
      .unwrap();
    assert_eq!(rows, 1);
  }

  // ── Transaction boundary ──────────────────────────────────────────────────

  static BUSY_CALLS: AtomicUsize = AtomicUsize::new(0);

  /// Busy handler that gives up immediately, counting each attempt.
  fn give_up(_: i32) -> bool {
    BUSY_CALLS.fetch_add(1, Ordering::SeqCst);
    false
  }

  #[test]
  fn busy_begin_is_retried_once_then_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let holder = Connection::open(&path).unwrap();
    holder.execute_batch(SCHEMA).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE").unwrap();

    let mut contender = Connection::open(&path).unwrap();
    contender.busy_handler(Some(give_up)).unwrap();

    let mut ran = false;
    let result = write_tx(&mut contender, |tx| {
      ran = true;
      tx.execute(
        "INSERT INTO categories VALUES ('x', 'Never', NULL, 1)",
        [],
      )?;
      Ok(())
    });

    assert!(!ran);
    assert_eq!(BUSY_CALLS.load(Ordering::SeqCst), 2);
    let err = result.unwrap_err();
    assert!(matches!(
      CatalogError::from(err),
      CatalogError::Storage(_)
    ));

    holder.execute_batch("ROLLBACK").unwrap();
    let rows: i64 = holder
      .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
      .unwrap();
    assert_eq!(rows, 0);
  }

  #[test]
  fn unknown_reference_is_invalid() {
    let conn = conn();
    let err = validate_reference(&conn, EntityKind::Product, Uuid::new_v4()).unwrap_err();
    assert!(matches!(
      err,
      crate::Error::Catalog(CatalogError::ReferenceInvalid { kind: EntityKind::Product, .. })
    ));
  }

  #[test]
  fn only_active_references_are_found() {
    let conn = conn();
    let live = Uuid::new_v4();
    let gone = Uuid::new_v4();
    conn
      .execute_batch(&format!(
        "INSERT INTO users VALUES ('{live}', 'live@example.com', 'h', 'buyer', 1);
         INSERT INTO users VALUES ('{gone}', 'gone@example.com', 'h', 'buyer', 0);"
      ))
      .unwrap();

    validate_reference(&conn, EntityKind::User, live).unwrap();
    let err = validate_reference(&conn, EntityKind::User, gone).unwrap_err();
    assert!(matches!(
      err,
      crate::Error::Catalog(CatalogError::ReferenceInvalid { kind: EntityKind::User, id })
        if id == gone
    ));
  }
}
