//! Generic handlers for the nine section resource endpoints.
//!
//! One handler set serves every section type; the router registers it once
//! per type under that section's path. Each endpoint pair behaves the same
//! way:
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/<section>` | All rows of this section type |
//! | `POST`   | `/<section>` | Body: `{"cover_id": …, <fields>}` |
//! | `GET`    | `/<section>/{id}` | By section id |
//! | `PUT`    | `/<section>/{id}` | Whole-payload replacement |
//! | `DELETE` | `/<section>/{id}` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use harvest_core::{
  ValidationReport,
  sections::{SectionData, SectionRecord},
  store::InterviewStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, store_error};

/// JSON body accepted by `POST /<section>`: the owning cover plus the
/// section's own fields, flattened.
#[derive(Debug, Deserialize)]
pub struct CreateSectionBody<T> {
  pub cover_id: Uuid,
  #[serde(flatten)]
  pub data:     T,
}

fn validated<T: SectionData>(data: &T) -> Result<(), ApiError> {
  let mut report = ValidationReport::new();
  data.validate("", &mut report);
  if report.is_empty() {
    Ok(())
  } else {
    Err(ApiError::Validation(report))
  }
}

/// `GET /<section>`
pub async fn list<S, T>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<SectionRecord<T>>>, ApiError>
where
  S: InterviewStore,
  T: SectionData,
{
  let records = store.list_sections::<T>().await.map_err(store_error)?;
  Ok(Json(records))
}

/// `POST /<section>` — 404 for an unknown cover, 409 when the cover already
/// has a section of this type.
pub async fn create<S, T>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateSectionBody<T>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InterviewStore,
  T: SectionData,
{
  validated(&body.data)?;

  store
    .get_cover(body.cover_id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("cover {} not found", body.cover_id))
    })?;

  let record = store
    .insert_section(body.cover_id, body.data)
    .await
    .map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /<section>/{id}`
pub async fn get_one<S, T>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SectionRecord<T>>, ApiError>
where
  S: InterviewStore,
  T: SectionData,
{
  let record = store
    .get_section::<T>(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("section {id} not found")))?;
  Ok(Json(record))
}

/// `PUT /<section>/{id}` — replaces the whole payload.
pub async fn update<S, T>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(data): Json<T>,
) -> Result<Json<SectionRecord<T>>, ApiError>
where
  S: InterviewStore,
  T: SectionData,
{
  validated(&data)?;

  let record = store
    .update_section(id, data)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("section {id} not found")))?;
  Ok(Json(record))
}

/// `DELETE /<section>/{id}`
pub async fn delete<S, T>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: InterviewStore,
  T: SectionData,
{
  if store.delete_section::<T>(id).await.map_err(store_error)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("section {id} not found")))
  }
}
