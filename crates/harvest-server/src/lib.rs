//! HTTP server for the harvest survey collection backend.
//!
//! Wires the JSON API from `harvest-api` behind bearer-token auth and adds
//! the `/auth` endpoints (signup, login, logout). The store is any type
//! implementing both [`InterviewStore`] and [`AuthStore`]; the binary uses
//! `harvest-store-sqlite`.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::post};
use harvest_core::store::{AuthStore, InterviewStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (or
/// `HARVEST_`-prefixed environment variables).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router: `/auth/*` open, `/api/*` gated by a
/// live bearer token.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: InterviewStore + AuthStore + Send + Sync + 'static,
{
  let api = harvest_api::api_router(store.clone()).layer(
    middleware::from_fn_with_state(store.clone(), auth::require_auth::<S>),
  );

  let auth_routes = Router::new()
    .route("/signup", post(auth::signup::<S>))
    .route("/login", post(auth::login::<S>))
    .route("/logout", post(auth::logout::<S>))
    .with_state(store);

  Router::new()
    .nest("/auth", auth_routes)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
