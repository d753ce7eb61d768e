//! The `InterviewStore` and `AuthStore` traits and supporting types.
//!
//! The traits are implemented by storage backends (e.g.
//! `harvest-store-sqlite`). Higher layers (`harvest-api`, `harvest-server`)
//! depend on these abstractions, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  cover::{Cover, CoverPatch},
  sections::{SectionData, SectionRecord, Sections},
  sync::Interview,
};

// ─── Backend error classification ────────────────────────────────────────────

/// Implemented by backend error types so callers can classify failures
/// without naming the backend.
///
/// Uniqueness is enforced by the storage layer; a violated unique constraint
/// during creation is a retryable condition (for derived codes) or a caller
/// conflict (for supplied ones), and the sync coordinator needs to know the
/// offending column to tell the two apart.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The column behind a violated unique constraint, if this error is one.
  fn unique_conflict(&self) -> Option<&str>;
}

// ─── Interview store ─────────────────────────────────────────────────────────

/// Abstraction over a survey store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). The nested
/// operations (`create_interview`, `update_interview`) persist the cover and
/// its section rows inside ONE atomic unit of work: either everything in the
/// call is applied, or nothing is — no partial state is ever observable to a
/// second reader.
pub trait InterviewStore: Send + Sync {
  type Error: StoreError;

  // ── Covers ────────────────────────────────────────────────────────────

  /// Persist a fully materialised cover. Code derivation happens before
  /// this call; the store writes the record verbatim.
  fn create_cover(
    &self,
    cover: Cover,
  ) -> impl Future<Output = Result<Cover, Self::Error>> + Send + '_;

  /// Retrieve a cover by id. Returns `None` if not found.
  fn get_cover(
    &self,
    cover_id: Uuid,
  ) -> impl Future<Output = Result<Option<Cover>, Self::Error>> + Send + '_;

  /// List all covers, oldest first.
  fn list_covers(
    &self,
  ) -> impl Future<Output = Result<Vec<Cover>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the cover does not exist.
  fn update_cover(
    &self,
    cover_id: Uuid,
    patch: CoverPatch,
  ) -> impl Future<Output = Result<Option<Cover>, Self::Error>> + Send + '_;

  /// Delete a cover and, by cascade, all of its section rows. Returns
  /// `false` if the cover did not exist.
  fn delete_cover(
    &self,
    cover_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sections (generic over the nine section types) ────────────────────

  /// Insert a section for `cover_id`. Each section type is 0..1 per cover;
  /// inserting a second one surfaces the unique constraint on `cover_id`.
  fn insert_section<T: SectionData>(
    &self,
    cover_id: Uuid,
    data: T,
  ) -> impl Future<Output = Result<SectionRecord<T>, Self::Error>> + Send + '_;

  fn get_section<T: SectionData>(
    &self,
    section_id: Uuid,
  ) -> impl Future<Output = Result<Option<SectionRecord<T>>, Self::Error>>
  + Send
  + '_;

  /// The section of type `T` attached to `cover_id`, if any.
  fn section_for_cover<T: SectionData>(
    &self,
    cover_id: Uuid,
  ) -> impl Future<Output = Result<Option<SectionRecord<T>>, Self::Error>>
  + Send
  + '_;

  fn list_sections<T: SectionData>(
    &self,
  ) -> impl Future<Output = Result<Vec<SectionRecord<T>>, Self::Error>>
  + Send
  + '_;

  /// Replace the payload of an existing section row. Returns `None` if the
  /// row does not exist.
  fn update_section<T: SectionData>(
    &self,
    section_id: Uuid,
    data: T,
  ) -> impl Future<Output = Result<Option<SectionRecord<T>>, Self::Error>>
  + Send
  + '_;

  fn delete_section<T: SectionData>(
    &self,
    section_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Nested interview operations ───────────────────────────────────────

  /// The cover plus every attached section, or `None` if the cover does
  /// not exist.
  fn get_interview(
    &self,
    cover_id: Uuid,
  ) -> impl Future<Output = Result<Option<Interview>, Self::Error>> + Send + '_;

  /// Persist a cover and the present sections as one atomic unit.
  fn create_interview(
    &self,
    cover: Cover,
    sections: Sections,
  ) -> impl Future<Output = Result<Interview, Self::Error>> + Send + '_;

  /// Patch a cover and upsert the present sections as one atomic unit.
  /// Returns `Ok(None)` — with nothing written — if the cover does not
  /// exist.
  fn update_interview(
    &self,
    cover_id: Uuid,
    patch: CoverPatch,
    sections: Sections,
  ) -> impl Future<Output = Result<Option<Interview>, Self::Error>> + Send + '_;
}

// ─── Auth store ──────────────────────────────────────────────────────────────

/// An account that may call the collection API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub email:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Accounts and bearer tokens. Password hashing happens in the caller; the
/// store only ever sees PHC hash strings.
pub trait AuthStore: Send + Sync {
  type Error: StoreError;

  /// Create an account. A taken username surfaces the unique constraint on
  /// `username`.
  fn create_user(
    &self,
    username: String,
    email: Option<String>,
    password_hash: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look up an account and its stored password hash by username.
  fn user_with_password<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<(User, String)>, Self::Error>>
  + Send
  + 'a;

  /// Register an issued bearer token for `user_id`.
  fn insert_token(
    &self,
    token: String,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Invalidate a token. Returns `false` if it was not known.
  fn delete_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Resolve a bearer token to its account, if the token is live.
  fn user_for_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;
}
