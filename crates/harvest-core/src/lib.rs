//! Core types and trait definitions for the harvest survey store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod code;
pub mod cover;
pub mod error;
pub mod sections;
pub mod store;
pub mod sync;
pub mod validate;

pub use error::SyncError;
pub use validate::ValidationReport;
