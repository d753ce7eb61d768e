//! JSON REST API for the harvest survey store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`harvest_core::store::InterviewStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", harvest_api::api_router(store.clone()))
//! ```

pub mod covers;
pub mod error;
pub mod sections;
pub mod sync;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use harvest_core::{
  sections::{
    AdultInHousehold, ChildInHousehold, ChildRemediation, ConsentLocation,
    EndOfCollection, FarmerIdentification, HouseholdSensitization,
    OwnerIdentification, SectionData, WorkerInFarm,
  },
  store::InterviewStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: InterviewStore + Send + Sync + 'static,
{
  let mut router = Router::new()
    // Covers
    .route("/covers", get(covers::list::<S>).post(covers::create::<S>))
    .route(
      "/covers/{id}",
      get(covers::get_one::<S>)
        .put(covers::update::<S>)
        .delete(covers::delete::<S>),
    )
    // Nested sync
    .route("/cover-sync", post(sync::create::<S>))
    .route("/cover-sync/{id}", put(sync::update::<S>));

  // One resource endpoint pair per section type.
  router = section_routes::<S, ConsentLocation>(router);
  router = section_routes::<S, FarmerIdentification>(router);
  router = section_routes::<S, OwnerIdentification>(router);
  router = section_routes::<S, WorkerInFarm>(router);
  router = section_routes::<S, AdultInHousehold>(router);
  router = section_routes::<S, ChildInHousehold>(router);
  router = section_routes::<S, ChildRemediation>(router);
  router = section_routes::<S, HouseholdSensitization>(router);
  router = section_routes::<S, EndOfCollection>(router);

  router.with_state(store)
}

/// Register the list/create and get/update/delete routes for one section
/// type under its kebab-case path (`consent_location` → `/consent-location`).
fn section_routes<S, T>(router: Router<Arc<S>>) -> Router<Arc<S>>
where
  S: InterviewStore + Send + Sync + 'static,
  T: SectionData,
{
  let path = T::KEY.replace('_', "-");
  router
    .route(
      &format!("/{path}"),
      get(sections::list::<S, T>).post(sections::create::<S, T>),
    )
    .route(
      &format!("/{path}/{{id}}"),
      get(sections::get_one::<S, T>)
        .put(sections::update::<S, T>)
        .delete(sections::delete::<S, T>),
    )
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
  };
  use harvest_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  fn cover_fields() -> Value {
    json!({
      "enumerator_name": "Abena Owusu",
      "country": "Ghana",
      "region": "Ashanti",
      "district": "Ejisu",
      "society": "Besease",
      "farmer_surname": "Mensah",
      "farmer_first_name": "Kwame",
      "risk_classification": "Medium",
      "client": "AgriCo",
      "num_farmer_children": 2,
      "list_children": "Ama, Kojo"
    })
  }

  fn consent_fields() -> Value {
    json!({
      "interview_start_time": "2024-06-03T09:15:00Z",
      "gps_point": "6.6885,-1.6244",
      "community_type": "Village",
      "farmer_resides_in_community": "yes",
      "farmer_available": "yes"
    })
  }

  fn sensitization_fields(female_adults: u32) -> Value {
    json!({
      "sensitized_good_parenting": "yes",
      "sensitized_child_protection": "yes",
      "sensitized_safe_labour": "yes",
      "number_of_female_adults": female_adults,
      "number_of_male_adults": 1,
      "picture_of_respondent": "no"
    })
  }

  fn sync_payload() -> Value {
    let mut payload = cover_fields();
    payload["consent_location"] = consent_fields();
    payload["household_sensitization"] = sensitization_fields(2);
    payload
  }

  // ── Nested sync ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sync_create_returns_nested_interview_with_codes() {
    let app = router().await;
    let (status, body) =
      request(&app, "POST", "/cover-sync", Some(sync_payload())).await;

    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    let farmer_code = body["farmer_code"].as_str().unwrap();
    assert!(farmer_code.starts_with("FARM-KWA-"), "code: {farmer_code}");
    assert!(body["enumerator_code"].as_str().unwrap().starts_with("ENUM-"));
    assert!(body["society_code"].as_str().unwrap().starts_with("SOC-"));
    assert_eq!(body["consent_location"]["community_type"], "Village");
    assert_eq!(
      body["household_sensitization"]["number_of_female_adults"],
      2
    );

    let (status, covers) = request(&app, "GET", "/covers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(covers.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn sync_create_with_invalid_section_writes_nothing() {
    let app = router().await;
    let mut payload = sync_payload();
    payload["household_sensitization"] = sensitization_fields(0);

    let (status, body) =
      request(&app, "POST", "/cover-sync", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["errors"]["household_sensitization.number_of_female_adults"]
        .is_array(),
      "body: {body}"
    );

    // Atomicity: neither the cover nor any section row was written.
    let (_, covers) = request(&app, "GET", "/covers", None).await;
    assert!(covers.as_array().unwrap().is_empty());
    let (_, consents) =
      request(&app, "GET", "/consent-location", None).await;
    assert!(consents.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn sync_update_of_unknown_cover_is_404() {
    let app = router().await;
    let uri =
      format!("/cover-sync/{}", uuid::Uuid::new_v4());
    let (status, _) =
      request(&app, "PUT", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn sync_update_patches_cover_and_upserts_sections() {
    let app = router().await;
    let (_, created) =
      request(&app, "POST", "/cover-sync", Some(sync_payload())).await;
    let cover_id = created["cover_id"].as_str().unwrap();

    let patch = json!({
      "risk_classification": "High",
      "household_sensitization": sensitization_fields(5),
      "end_of_collection": { "feedback_enum": "collection complete" }
    });
    let (status, updated) = request(
      &app,
      "PUT",
      &format!("/cover-sync/{cover_id}"),
      Some(patch),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {updated}");
    assert_eq!(updated["risk_classification"], "High");
    // Untouched values survive.
    assert_eq!(updated["farmer_code"], created["farmer_code"]);
    assert_eq!(
      updated["consent_location"], created["consent_location"],
      "omitted section must be left unchanged"
    );
    // Present sections are upserted.
    assert_eq!(
      updated["household_sensitization"]["number_of_female_adults"],
      5
    );
    assert_eq!(
      updated["end_of_collection"]["feedback_enum"],
      "collection complete"
    );
  }

  #[tokio::test]
  async fn sync_response_round_trips_as_update_payload() {
    let app = router().await;
    let (_, created) =
      request(&app, "POST", "/cover-sync", Some(sync_payload())).await;
    let cover_id = created["cover_id"].as_str().unwrap().to_string();

    let (status, echoed) = request(
      &app,
      "PUT",
      &format!("/cover-sync/{cover_id}"),
      Some(created.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed, created, "round-trip must produce no diff");
  }

  #[tokio::test]
  async fn explicit_duplicate_farmer_code_is_a_conflict() {
    let app = router().await;
    let mut first = sync_payload();
    first["farmer_code"] = json!("FARM-DUP");
    let (status, _) =
      request(&app, "POST", "/cover-sync", Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut second = sync_payload();
    second["farmer_code"] = json!("FARM-DUP");
    let (status, body) =
      request(&app, "POST", "/cover-sync", Some(second)).await;
    assert_eq!(status, StatusCode::CONFLICT, "body: {body}");

    let (_, covers) = request(&app, "GET", "/covers", None).await;
    assert_eq!(covers.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn unknown_choice_value_is_a_client_error() {
    let app = router().await;
    let mut payload = sync_payload();
    payload["consent_location"]["community_type"] = json!("Metropolis");
    let (status, _) =
      request(&app, "POST", "/cover-sync", Some(payload)).await;
    assert!(status.is_client_error(), "status: {status}");
  }

  // ── Cover resource endpoints ────────────────────────────────────────────

  #[tokio::test]
  async fn cover_crud_flow() {
    let app = router().await;

    let (status, created) =
      request(&app, "POST", "/covers", Some(cover_fields())).await;
    assert_eq!(status, StatusCode::CREATED, "body: {created}");
    assert!(created["farmer_code"].as_str().unwrap().starts_with("FARM-"));
    let id = created["cover_id"].as_str().unwrap().to_string();

    let (status, fetched) =
      request(&app, "GET", &format!("/covers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = request(
      &app,
      "PUT",
      &format!("/covers/{id}"),
      Some(json!({ "client": "CocoaCorp" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["client"], "CocoaCorp");
    assert_eq!(updated["farmer_code"], created["farmer_code"]);

    let (status, _) =
      request(&app, "DELETE", &format!("/covers/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
      request(&app, "GET", &format!("/covers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn cover_create_rejects_bad_fields_per_field() {
    let app = router().await;
    let mut fields = cover_fields();
    fields["district"] = json!("Ejisu Juaben 9");
    let (status, body) =
      request(&app, "POST", "/covers", Some(fields)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["district"].is_array(), "body: {body}");
  }

  // ── Section resource endpoints ──────────────────────────────────────────

  #[tokio::test]
  async fn section_crud_flow() {
    let app = router().await;
    let (_, cover) =
      request(&app, "POST", "/covers", Some(cover_fields())).await;
    let cover_id = cover["cover_id"].as_str().unwrap();

    let mut body = consent_fields();
    body["cover_id"] = json!(cover_id);
    let (status, created) =
      request(&app, "POST", "/consent-location", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "body: {created}");
    let section_id = created["section_id"].as_str().unwrap().to_string();

    // One section of a type per cover.
    let (status, _) =
      request(&app, "POST", "/consent-location", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) =
      request(&app, "GET", "/consent-location", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let mut replacement = consent_fields();
    replacement["gps_point"] = json!("6.7000,-1.6000");
    let (status, updated) = request(
      &app,
      "PUT",
      &format!("/consent-location/{section_id}"),
      Some(replacement),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["gps_point"], "6.7000,-1.6000");

    let (status, _) = request(
      &app,
      "DELETE",
      &format!("/consent-location/{section_id}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn section_create_for_unknown_cover_is_404() {
    let app = router().await;
    let mut body = consent_fields();
    body["cover_id"] = json!(uuid::Uuid::new_v4().to_string());
    let (status, _) =
      request(&app, "POST", "/consent-location", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn section_validation_reports_per_field() {
    let app = router().await;
    let (_, cover) =
      request(&app, "POST", "/covers", Some(cover_fields())).await;

    let mut body = sensitization_fields(0);
    body["cover_id"] = cover["cover_id"].clone();
    let (status, resp) =
      request(&app, "POST", "/household-sensitization", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      resp["errors"]["number_of_female_adults"].is_array(),
      "body: {resp}"
    );
  }
}
