//! SQL schema for the catalog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,              -- 'buyer' | 'seller' | 'admin'
    active        INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    parent_id   TEXT REFERENCES categories(category_id),
    active      INTEGER NOT NULL DEFAULT 1,
    CHECK (parent_id IS NULL OR parent_id != category_id)
);

CREATE TABLE IF NOT EXISTS products (
    product_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    price       TEXT NOT NULL,                -- decimal string, 2 places max
    image_url   TEXT,
    stock       INTEGER NOT NULL CHECK (stock >= 0),
    category_id TEXT NOT NULL REFERENCES categories(category_id),
    active      INTEGER NOT NULL DEFAULT 1,
    -- Mean grade of active reviews; written only by the rating recompute.
    rating      REAL NOT NULL DEFAULT 0
);

-- Rows are never deleted; `active = 0` is a soft delete.
CREATE TABLE IF NOT EXISTS reviews (
    review_id    TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    product_id   TEXT NOT NULL REFERENCES products(product_id),
    comment      TEXT NOT NULL,
    comment_date TEXT NOT NULL,               -- ISO 8601 UTC; server-assigned
    grade        INTEGER NOT NULL CHECK (grade BETWEEN 1 AND 5),
    active       INTEGER NOT NULL DEFAULT 1
);

-- Authoritative uniqueness guard: one active review per (user, product).
CREATE UNIQUE INDEX IF NOT EXISTS reviews_active_user_product_idx
    ON reviews(user_id, product_id) WHERE active = 1;

CREATE INDEX IF NOT EXISTS reviews_product_idx    ON reviews(product_id);
CREATE INDEX IF NOT EXISTS products_category_idx  ON products(category_id);
CREATE INDEX IF NOT EXISTS categories_parent_idx  ON categories(parent_id);

PRAGMA user_version = 1;
";
