//! Server wiring for the catalog: configuration, the traced router, and
//! admin provisioning.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use catalog_core::{
  service::Catalog,
  store::CatalogStore,
  user::{NewUser, Role, User},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Minimum length accepted for an admin password.
pub const MIN_PASSWORD_LEN: usize = 8;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CATALOG_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("catalog.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Layer the optional TOML file at `path` under `CATALOG_*` environment
/// variables.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("CATALOG"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn router<S>(catalog: Arc<Catalog<S>>) -> Router
where
  S: CatalogStore + 'static,
{
  catalog_api::api_router(catalog).layer(TraceLayer::new_for_http())
}

// ─── Provisioning ─────────────────────────────────────────────────────────────

/// Register an admin account. Open registration never grants this role.
pub async fn create_admin<S: CatalogStore>(
  catalog: &Catalog<S>,
  email: &str,
  password: &str,
) -> anyhow::Result<User> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
  }

  let password_hash = catalog_api::auth::hash_password(password)?;
  let user = catalog
    .register_user(NewUser {
      email: email.to_owned(),
      password_hash,
      role: Role::Admin,
    })
    .await
    .with_context(|| format!("failed to create admin {email}"))?;
  Ok(user)
}
