//! Error type for `harvest-store-sqlite`.

use harvest_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("column decode error: {0}")]
  Decode(String),
}

impl StoreError for Error {
  /// Extract the column behind a SQLite `UNIQUE constraint failed:
  /// <table>.<column>` failure, if that is what this error is.
  fn unique_conflict(&self) -> Option<&str> {
    let Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(err, Some(message)),
    )) = self
    else {
      return None;
    };
    if err.code != rusqlite::ErrorCode::ConstraintViolation {
      return None;
    }
    let rest = message.strip_prefix("UNIQUE constraint failed: ")?;
    // Multi-column constraints list "t.a, t.b"; report the first column.
    let (_, column) = rest.split(',').next()?.trim().split_once('.')?;
    Some(column)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
