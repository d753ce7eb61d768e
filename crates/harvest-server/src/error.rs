//! Error types and axum `IntoResponse` implementation for the auth layer.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("username already taken")]
  UsernameTaken,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("password hashing failed")]
  Hash,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"harvest\""),
        );
        res
      }
      Error::UsernameTaken => (
        StatusCode::CONFLICT,
        Json(json!({ "error": "username already taken" })),
      )
        .into_response(),
      Error::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m })))
          .into_response()
      }
      Error::Hash => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "password hashing failed" })),
      )
        .into_response(),
      Error::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
