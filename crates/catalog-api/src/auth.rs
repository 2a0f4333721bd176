//! HTTP Basic-auth extractor and password hashing.
//!
//! Credentials are `email:password`. The user is looked up by email, the
//! password is verified against the stored argon2 PHC string, and only an
//! active user yields a [`Principal`].

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use catalog_core::{service::Catalog, store::CatalogStore, user::Principal};
use rand_core::OsRng;
use tracing::debug;

use crate::error::ApiError;

/// Hash `password` with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))?;
  Ok(hash.to_string())
}

/// Split a `Basic` authorization header into `(email, password)`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Resolve the request's credentials to an active [`Principal`].
pub async fn authenticate<S: CatalogStore>(
  catalog: &Catalog<S>,
  headers: &HeaderMap,
) -> Result<Principal, ApiError> {
  let (email, password) = basic_credentials(headers)?;

  let Some(user) = catalog.find_user_by_email(&email).await? else {
    debug!(%email, "authentication failed: unknown email");
    return Err(ApiError::Unauthorized);
  };

  let parsed_hash =
    PasswordHash::new(&user.password_hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| {
      debug!(user_id = %user.user_id, "authentication failed: bad password");
      ApiError::Unauthorized
    })?;

  if !user.lifecycle.is_active() {
    debug!(user_id = %user.user_id, "authentication failed: user inactive");
    return Err(ApiError::Unauthorized);
  }

  Ok(Principal::from(&user))
}

/// Present in a handler's arguments means the request carried valid
/// credentials for an active user.
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<Arc<Catalog<S>>> for Authenticated
where
  S: CatalogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    catalog: &Arc<Catalog<S>>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(catalog, &parts.headers).await.map(Authenticated)
  }
}
