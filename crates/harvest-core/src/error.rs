//! Error types for `harvest-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationReport;

/// Failure of a nested sync operation, generic over the backend error.
///
/// Every variant aborts the entire nested write; there is no partial-success
/// state to reconcile.
#[derive(Debug, Error)]
pub enum SyncError<E: std::error::Error + Send + Sync + 'static> {
  /// One or more fields failed validation; nothing was written.
  #[error("{0}")]
  Validation(ValidationReport),

  /// An update targeted a cover that does not exist.
  #[error("cover not found: {0}")]
  NotFound(Uuid),

  /// A code collided with an existing unique value and could not (or must
  /// not) be re-derived.
  #[error("unique value conflict on {column}")]
  Conflict { column: String },

  /// The backend failed for reasons unrelated to the payload.
  #[error("store error: {0}")]
  Store(#[source] E),
}
