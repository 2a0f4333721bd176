//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings,
//! prices decimal strings, and lifecycle an `active` integer flag (the
//! partial uniqueness index on reviews is keyed on it).

use chrono::{DateTime, Utc};
use catalog_core::{
  category::Category,
  lifecycle::Lifecycle,
  product::Product,
  review::Review,
  user::{Role, User},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

pub fn encode_lifecycle(l: Lifecycle) -> bool { l.is_active() }

pub fn decode_lifecycle(active: bool) -> Lifecycle {
  if active { Lifecycle::Active } else { Lifecycle::Inactive }
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Buyer => "buyer",
    Role::Seller => "seller",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "buyer" => Ok(Role::Buyer),
    "seller" => Ok(Role::Seller),
    "admin" => Ok(Role::Admin),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_price(p: Decimal) -> String { p.to_string() }

pub fn decode_price(s: &str) -> Result<Decimal> {
  s.parse::<Decimal>()
    .map_err(|e| Error::Decode(format!("invalid price {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, email, password_hash, role, active";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub role:          String,
  pub active:        bool,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      active:        row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      lifecycle:     decode_lifecycle(self.active),
    })
  }
}

pub const CATEGORY_COLUMNS: &str = "category_id, name, parent_id, active";

/// Raw values read directly from a `categories` row.
pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
  pub parent_id:   Option<String>,
  pub active:      bool,
}

impl RawCategory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      category_id: row.get(0)?,
      name:        row.get(1)?,
      parent_id:   row.get(2)?,
      active:      row.get(3)?,
    })
  }

  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      category_id: decode_uuid(&self.category_id)?,
      name:        self.name,
      parent_id:   self.parent_id.as_deref().map(decode_uuid).transpose()?,
      lifecycle:   decode_lifecycle(self.active),
    })
  }
}

pub const PRODUCT_COLUMNS: &str = "product_id, name, description, price, \
                                   image_url, stock, category_id, active, rating";

/// Raw values read directly from a `products` row.
pub struct RawProduct {
  pub product_id:  String,
  pub name:        String,
  pub description: Option<String>,
  pub price:       String,
  pub image_url:   Option<String>,
  pub stock:       u32,
  pub category_id: String,
  pub active:      bool,
  pub rating:      f64,
}

impl RawProduct {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:  row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      price:       row.get(3)?,
      image_url:   row.get(4)?,
      stock:       row.get(5)?,
      category_id: row.get(6)?,
      active:      row.get(7)?,
      rating:      row.get(8)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      product_id:  decode_uuid(&self.product_id)?,
      name:        self.name,
      description: self.description,
      price:       decode_price(&self.price)?,
      image_url:   self.image_url,
      stock:       self.stock,
      category_id: decode_uuid(&self.category_id)?,
      lifecycle:   decode_lifecycle(self.active),
      rating:      self.rating,
    })
  }
}

pub const REVIEW_COLUMNS: &str =
  "review_id, user_id, product_id, comment, comment_date, grade, active";

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub review_id:    String,
  pub user_id:      String,
  pub product_id:   String,
  pub comment:      String,
  pub comment_date: String,
  pub grade:        u8,
  pub active:       bool,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:    row.get(0)?,
      user_id:      row.get(1)?,
      product_id:   row.get(2)?,
      comment:      row.get(3)?,
      comment_date: row.get(4)?,
      grade:        row.get(5)?,
      active:       row.get(6)?,
    })
  }

  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id:    decode_uuid(&self.review_id)?,
      user_id:      decode_uuid(&self.user_id)?,
      product_id:   decode_uuid(&self.product_id)?,
      comment:      self.comment,
      comment_date: decode_dt(&self.comment_date)?,
      grade:        self.grade,
      lifecycle:    decode_lifecycle(self.active),
    })
  }
}
