//! Handlers for `/covers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/covers` | All covers, oldest first |
//! | `POST`   | `/covers` | Body: [`NewCover`]; missing codes are derived |
//! | `GET`    | `/covers/{id}` | 404 if not found |
//! | `PUT`    | `/covers/{id}` | Body: [`CoverPatch`]; partial update |
//! | `DELETE` | `/covers/{id}` | Cascades all section rows |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use harvest_core::{
  ValidationReport,
  cover::{Cover, CoverPatch, NewCover},
  sections::Sections,
  store::InterviewStore,
  sync::{InterviewPayload, sync_create},
};
use uuid::Uuid;

use crate::error::{ApiError, store_error};

/// `GET /covers`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Cover>>, ApiError>
where
  S: InterviewStore,
{
  let covers = store.list_covers().await.map_err(store_error)?;
  Ok(Json(covers))
}

/// `POST /covers` — returns 201 + the stored cover, with derived codes
/// filled in. Runs through the sync coordinator so code derivation and
/// conflict handling behave exactly as in a nested create.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCover>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InterviewStore,
{
  let payload =
    InterviewPayload { cover: body, sections: Sections::default() };
  let interview = sync_create(store.as_ref(), payload).await?;
  Ok((StatusCode::CREATED, Json(interview.cover)))
}

/// `GET /covers/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Cover>, ApiError>
where
  S: InterviewStore,
{
  let cover = store
    .get_cover(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("cover {id} not found")))?;
  Ok(Json(cover))
}

/// `PUT /covers/{id}` — partial update; absent fields stay unchanged.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<CoverPatch>,
) -> Result<Json<Cover>, ApiError>
where
  S: InterviewStore,
{
  let mut report = ValidationReport::new();
  patch.validate("", &mut report);
  if !report.is_empty() {
    return Err(ApiError::Validation(report));
  }

  let cover = store
    .update_cover(id, patch)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("cover {id} not found")))?;
  Ok(Json(cover))
}

/// `DELETE /covers/{id}` — deletes the cover and all its sections.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: InterviewStore,
{
  if store.delete_cover(id).await.map_err(store_error)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("cover {id} not found")))
  }
}
