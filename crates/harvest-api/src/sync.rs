//! Handlers for the nested `/cover-sync` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cover-sync` | Nested create; 201 + the full interview |
//! | `PUT`  | `/cover-sync/{id}` | Nested partial update; 200 |
//!
//! The payload carries the cover fields at the top level plus zero or more
//! section objects keyed by section name. Validation failures report per
//! field and write nothing; the response mirrors the payload shape with
//! derived identifiers filled in, and round-trips as an update payload.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use harvest_core::{
  store::InterviewStore,
  sync::{Interview, InterviewPatch, InterviewPayload, sync_create,
    sync_update},
};
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /cover-sync`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(payload): Json<InterviewPayload>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InterviewStore,
{
  let interview = sync_create(store.as_ref(), payload).await?;
  Ok((StatusCode::CREATED, Json(interview)))
}

/// `PUT /cover-sync/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<InterviewPatch>,
) -> Result<Json<Interview>, ApiError>
where
  S: InterviewStore,
{
  let interview = sync_update(store.as_ref(), id, patch).await?;
  Ok(Json(interview))
}
