//! SQLite backend for the harvest survey store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Nested interview writes run
//! inside a single SQLite transaction; the one-to-one cover/section shape is
//! enforced by a unique constraint on every section table's `cover_id`.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
