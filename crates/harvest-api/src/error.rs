//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use harvest_core::{SyncError, ValidationReport, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// One or more fields failed validation. Serialises as
  /// `{"errors": {"<field path>": ["<message>", …]}}`.
  #[error("{0}")]
  Validation(ValidationReport),

  #[error("not found: {0}")]
  NotFound(String),

  /// A unique value (code, username, section per cover) already exists.
  #[error("unique value conflict on {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(report) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "errors": report })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m })))
          .into_response()
      }
      ApiError::Conflict(column) => (
        StatusCode::CONFLICT,
        Json(json!({
          "error": format!("unique value conflict on {column}")
        })),
      )
        .into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m })))
          .into_response()
      }
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}

impl<E: StoreError> From<SyncError<E>> for ApiError {
  fn from(e: SyncError<E>) -> Self {
    match e {
      SyncError::Validation(report) => ApiError::Validation(report),
      SyncError::NotFound(id) => {
        ApiError::NotFound(format!("cover {id} not found"))
      }
      SyncError::Conflict { column } => ApiError::Conflict(column),
      SyncError::Store(e) => ApiError::Store(Box::new(e)),
    }
  }
}

/// Map a bare backend error: unique conflicts become 409s, the rest 500s.
pub fn store_error<E: StoreError>(e: E) -> ApiError {
  match e.unique_conflict() {
    Some(column) => ApiError::Conflict(column.to_string()),
    None => ApiError::Store(Box::new(e)),
  }
}
