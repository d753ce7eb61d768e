//! Bearer-token auth: signup/login/logout handlers, the `AuthUser`
//! extractor, and the middleware gating the collection API.
//!
//! Passwords are stored as argon2 PHC strings; tokens are 32 random bytes,
//! hex-encoded, and live in the store until logout.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  middleware::Next,
  response::{IntoResponse, Response},
};
use harvest_core::store::{AuthStore, StoreError as _, User};
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;

// ─── Primitives ──────────────────────────────────────────────────────────────

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
}

fn issue_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Hash a password into an argon2 PHC string, e.g. `$argon2id$v=19$…`.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|_| Error::Hash)
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carried a live token;
/// carries the resolved account.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<Arc<S>> for AuthUser
where
  S: AuthStore + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
    let user = state
      .user_for_token(token)
      .await
      .map_err(store_err)?
      .ok_or(Error::Unauthorized)?;
    Ok(AuthUser(user))
  }
}

/// Middleware: reject any request without a live bearer token.
pub async fn require_auth<S>(
  State(store): State<Arc<S>>,
  request: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: AuthStore + Send + Sync + 'static,
{
  let token = bearer_token(request.headers()).ok_or(Error::Unauthorized)?;
  store
    .user_for_token(token)
    .await
    .map_err(store_err)?
    .ok_or(Error::Unauthorized)?;
  Ok(next.run(request).await)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub username: String,
  #[serde(default)]
  pub email:    Option<String>,
  pub password: String,
}

/// `POST /auth/signup` — create an account and issue its first token.
pub async fn signup<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, Error>
where
  S: AuthStore + Send + Sync + 'static,
{
  if body.username.trim().is_empty() {
    return Err(Error::BadRequest("username may not be blank".into()));
  }
  if body.password.len() < 8 {
    return Err(Error::BadRequest(
      "password must be at least 8 characters".into(),
    ));
  }

  let hash = hash_password(&body.password)?;
  let user = store
    .create_user(body.username, body.email, hash)
    .await
    .map_err(|e| match e.unique_conflict() {
      Some("username") => Error::UsernameTaken,
      _ => store_err(e),
    })?;

  let token = issue_token();
  store
    .insert_token(token.clone(), user.user_id)
    .await
    .map_err(store_err)?;

  Ok((
    StatusCode::CREATED,
    Json(json!({ "token": token, "user": user })),
  ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login` — verify credentials and issue a fresh token.
pub async fn login<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, Error>
where
  S: AuthStore + Send + Sync + 'static,
{
  let Some((user, hash)) = store
    .user_with_password(&body.username)
    .await
    .map_err(store_err)?
  else {
    return Err(Error::Unauthorized);
  };

  let parsed_hash =
    PasswordHash::new(&hash).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(body.password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  let token = issue_token();
  store
    .insert_token(token.clone(), user.user_id)
    .await
    .map_err(store_err)?;

  Ok(Json(json!({
    "token": token,
    "user_id": user.user_id,
    "username": user.username,
  })))
}

/// `POST /auth/logout` — invalidate the caller's token.
pub async fn logout<S>(
  State(store): State<Arc<S>>,
  _user: AuthUser,
  headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Error>
where
  S: AuthStore + Send + Sync + 'static,
{
  // The extractor has already resolved the token; it is present and live.
  let token = bearer_token(&headers).ok_or(Error::Unauthorized)?;
  store.delete_token(token).await.map_err(store_err)?;
  Ok(Json(json!({ "message": "successfully logged out" })))
}
