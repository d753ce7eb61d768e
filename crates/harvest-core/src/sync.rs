//! The sync coordinator — the atomic nested create/update operation
//! spanning a cover and its sections.
//!
//! The coordinator is stateless and reentrant: it validates the whole nested
//! payload up front (rejecting all-or-nothing with a per-field report),
//! derives any missing codes as an explicit pre-write step, and hands the
//! store one transactional write. Concurrency safety rests entirely on the
//! storage layer's transaction isolation and unique-constraint enforcement.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  cover::{Cover, CoverPatch, NewCover},
  error::SyncError,
  sections::Sections,
  store::{InterviewStore, StoreError as _},
  validate::ValidationReport,
};

// ─── Wire shapes ─────────────────────────────────────────────────────────────

/// A persisted interview: the cover with every attached section, in the
/// nested shape the sync endpoint speaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
  #[serde(flatten)]
  pub cover:    Cover,
  #[serde(flatten)]
  pub sections: Sections,
}

/// The nested create payload: cover fields at the top level plus zero or
/// more section objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewPayload {
  #[serde(flatten)]
  pub cover:    NewCover,
  #[serde(flatten)]
  pub sections: Sections,
}

/// The nested update payload. Cover fields present overwrite, absent stay;
/// each section present is upserted whole, keyed by the cover id. A sync
/// response deserialises as a patch, so responses round-trip as updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewPatch {
  #[serde(flatten)]
  pub cover:    CoverPatch,
  #[serde(flatten)]
  pub sections: Sections,
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// How many times a create is attempted when a *derived* code keeps
/// colliding. Collisions on caller-supplied codes are never retried.
const MAX_CODE_ATTEMPTS: u32 = 3;

/// Create a cover together with the supplied sections as one atomic unit.
///
/// Returns the fully nested representation of everything written, including
/// freshly derived codes.
pub async fn sync_create<S: InterviewStore>(
  store: &S,
  payload: InterviewPayload,
) -> Result<Interview, SyncError<S::Error>> {
  let mut report = ValidationReport::new();
  payload.cover.validate("", &mut report);
  payload.sections.validate(&mut report);
  if !report.is_empty() {
    return Err(SyncError::Validation(report));
  }

  let derived = payload.cover.derived_codes();
  let mut cover = payload.cover.into_cover();
  let mut attempts = 0;

  loop {
    attempts += 1;
    match store
      .create_interview(cover.clone(), payload.sections.clone())
      .await
    {
      Ok(interview) => return Ok(interview),
      Err(e) => match e.unique_conflict() {
        Some(column)
          if attempts < MAX_CODE_ATTEMPTS
            && derived.rederive(column, &mut cover) => {}
        Some(column) => {
          return Err(SyncError::Conflict { column: column.to_string() });
        }
        None => return Err(SyncError::Store(e)),
      },
    }
  }
}

/// Partially update a cover and upsert the supplied sections as one atomic
/// unit. Fails with [`SyncError::NotFound`] — writing nothing — when no
/// cover with `cover_id` exists.
pub async fn sync_update<S: InterviewStore>(
  store: &S,
  cover_id: Uuid,
  patch: InterviewPatch,
) -> Result<Interview, SyncError<S::Error>> {
  let mut report = ValidationReport::new();
  patch.cover.validate("", &mut report);
  patch.sections.validate(&mut report);
  if !report.is_empty() {
    return Err(SyncError::Validation(report));
  }

  match store
    .update_interview(cover_id, patch.cover, patch.sections)
    .await
  {
    Ok(Some(interview)) => Ok(interview),
    Ok(None) => Err(SyncError::NotFound(cover_id)),
    Err(e) => match e.unique_conflict() {
      Some(column) => {
        Err(SyncError::Conflict { column: column.to_string() })
      }
      None => Err(SyncError::Store(e)),
    },
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{
      Mutex,
      atomic::{AtomicU32, Ordering},
    },
  };

  use super::*;
  use crate::{
    sections::{
      HouseholdSensitization, SectionData, SectionRecord, YesNo,
    },
    store::StoreError,
  };

  // A minimal in-memory store: enough of `InterviewStore` for the
  // coordinator, with an injectable run of unique-constraint failures.
  #[derive(Default)]
  struct MemStore {
    interviews:       Mutex<HashMap<Uuid, Interview>>,
    create_attempts:  AtomicU32,
    /// Fail this many `create_interview` calls with a conflict on
    /// `farmer_code` before letting one through.
    forced_conflicts: AtomicU32,
  }

  #[derive(Debug, thiserror::Error)]
  enum MemError {
    #[error("unique constraint failed: covers.{0}")]
    Unique(&'static str),
  }

  impl StoreError for MemError {
    fn unique_conflict(&self) -> Option<&str> {
      match self {
        MemError::Unique(column) => Some(column),
      }
    }
  }

  impl MemStore {
    fn code_conflict(&self, cover: &Cover) -> Option<&'static str> {
      let interviews = self.interviews.lock().unwrap();
      for stored in interviews.values() {
        if stored.cover.enumerator_code == cover.enumerator_code {
          return Some("enumerator_code");
        }
        if stored.cover.society_code == cover.society_code {
          return Some("society_code");
        }
        if stored.cover.farmer_code == cover.farmer_code {
          return Some("farmer_code");
        }
      }
      None
    }
  }

  impl InterviewStore for MemStore {
    type Error = MemError;

    async fn create_cover(&self, _: Cover) -> Result<Cover, MemError> {
      unimplemented!()
    }
    async fn get_cover(&self, _: Uuid) -> Result<Option<Cover>, MemError> {
      unimplemented!()
    }
    async fn list_covers(&self) -> Result<Vec<Cover>, MemError> {
      unimplemented!()
    }
    async fn update_cover(
      &self,
      _: Uuid,
      _: CoverPatch,
    ) -> Result<Option<Cover>, MemError> {
      unimplemented!()
    }
    async fn delete_cover(&self, _: Uuid) -> Result<bool, MemError> {
      unimplemented!()
    }
    async fn insert_section<T: SectionData>(
      &self,
      _: Uuid,
      _: T,
    ) -> Result<SectionRecord<T>, MemError> {
      unimplemented!()
    }
    async fn get_section<T: SectionData>(
      &self,
      _: Uuid,
    ) -> Result<Option<SectionRecord<T>>, MemError> {
      unimplemented!()
    }
    async fn section_for_cover<T: SectionData>(
      &self,
      _: Uuid,
    ) -> Result<Option<SectionRecord<T>>, MemError> {
      unimplemented!()
    }
    async fn list_sections<T: SectionData>(
      &self,
    ) -> Result<Vec<SectionRecord<T>>, MemError> {
      unimplemented!()
    }
    async fn update_section<T: SectionData>(
      &self,
      _: Uuid,
      _: T,
    ) -> Result<Option<SectionRecord<T>>, MemError> {
      unimplemented!()
    }
    async fn delete_section<T: SectionData>(
      &self,
      _: Uuid,
    ) -> Result<bool, MemError> {
      unimplemented!()
    }

    async fn get_interview(
      &self,
      cover_id: Uuid,
    ) -> Result<Option<Interview>, MemError> {
      Ok(self.interviews.lock().unwrap().get(&cover_id).cloned())
    }

    async fn create_interview(
      &self,
      cover: Cover,
      sections: Sections,
    ) -> Result<Interview, MemError> {
      self.create_attempts.fetch_add(1, Ordering::SeqCst);
      if self
        .forced_conflicts
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
          n.checked_sub(1)
        })
        .is_ok()
      {
        return Err(MemError::Unique("farmer_code"));
      }
      if let Some(column) = self.code_conflict(&cover) {
        return Err(MemError::Unique(column));
      }
      let interview = Interview { cover, sections };
      self
        .interviews
        .lock()
        .unwrap()
        .insert(interview.cover.cover_id, interview.clone());
      Ok(interview)
    }

    async fn update_interview(
      &self,
      cover_id: Uuid,
      patch: CoverPatch,
      sections: Sections,
    ) -> Result<Option<Interview>, MemError> {
      let mut interviews = self.interviews.lock().unwrap();
      let Some(interview) = interviews.get_mut(&cover_id) else {
        return Ok(None);
      };
      patch.apply(&mut interview.cover);
      interview.sections.merge(sections);
      Ok(Some(interview.clone()))
    }
  }

  fn payload() -> InterviewPayload {
    InterviewPayload {
      cover:    NewCover {
        enumerator_name:     "Abena Owusu".into(),
        enumerator_code:     None,
        country:             "Ghana".into(),
        region:              "Ashanti".into(),
        district:            "Ejisu".into(),
        society:             "Besease".into(),
        society_code:        None,
        farmer_code:         None,
        farmer_surname:      "Mensah".into(),
        farmer_first_name:   "Kwame".into(),
        risk_classification: "Medium".into(),
        client:              "AgriCo".into(),
        num_farmer_children: 1,
        list_children:       "Ama".into(),
      },
      sections: Sections::default(),
    }
  }

  fn sensitization(female: u32) -> HouseholdSensitization {
    HouseholdSensitization {
      sensitized_good_parenting:   YesNo::Yes,
      sensitized_child_protection: YesNo::Yes,
      sensitized_safe_labour:      YesNo::Yes,
      number_of_female_adults:     female,
      number_of_male_adults:       1,
      picture_of_respondent:       YesNo::No,
      feedback_observations:       None,
    }
  }

  #[tokio::test]
  async fn create_derives_all_three_codes() {
    let store = MemStore::default();
    let interview = sync_create(&store, payload()).await.unwrap();
    assert!(interview.cover.enumerator_code.starts_with("ENUM-"));
    assert!(interview.cover.society_code.starts_with("SOC-"));
    assert!(interview.cover.farmer_code.starts_with("FARM-KWA-"));
  }

  #[tokio::test]
  async fn invalid_section_rejects_whole_payload() {
    let store = MemStore::default();
    let mut p = payload();
    p.sections.household_sensitization = Some(sensitization(0));

    let err = sync_create(&store, p).await.unwrap_err();
    let SyncError::Validation(report) = err else {
      panic!("expected validation error");
    };
    assert!(
      report
        .field("household_sensitization.number_of_female_adults")
        .is_some()
    );
    // Nothing was written — not even the cover.
    assert_eq!(store.create_attempts.load(Ordering::SeqCst), 0);
    assert!(store.interviews.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn derived_code_conflicts_are_retried_with_fresh_salt() {
    let store = MemStore::default();
    store.forced_conflicts.store(2, Ordering::SeqCst);

    let interview = sync_create(&store, payload()).await.unwrap();
    assert_eq!(store.create_attempts.load(Ordering::SeqCst), 3);
    assert!(interview.cover.farmer_code.starts_with("FARM-"));
  }

  #[tokio::test]
  async fn derived_code_retries_are_bounded() {
    let store = MemStore::default();
    store.forced_conflicts.store(10, Ordering::SeqCst);

    let err = sync_create(&store, payload()).await.unwrap_err();
    assert!(matches!(
      err,
      SyncError::Conflict { ref column } if column == "farmer_code"
    ));
    assert_eq!(store.create_attempts.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn supplied_code_conflict_is_not_retried() {
    let store = MemStore::default();

    let mut first = payload();
    first.cover.farmer_code = Some("FARM-DUP".into());
    sync_create(&store, first).await.unwrap();

    let mut second = payload();
    second.cover.farmer_code = Some("FARM-DUP".into());
    let attempts_before = store.create_attempts.load(Ordering::SeqCst);
    let err = sync_create(&store, second).await.unwrap_err();

    assert!(matches!(
      err,
      SyncError::Conflict { ref column } if column == "farmer_code"
    ));
    assert_eq!(
      store.create_attempts.load(Ordering::SeqCst),
      attempts_before + 1,
      "a supplied code must fail on the first attempt"
    );
  }

  #[tokio::test]
  async fn update_of_missing_cover_is_not_found() {
    let store = MemStore::default();
    let missing = Uuid::new_v4();
    let err = sync_update(&store, missing, InterviewPatch::default())
      .await
      .unwrap_err();
    assert!(matches!(err, SyncError::NotFound(id) if id == missing));
  }

  #[tokio::test]
  async fn partial_update_leaves_other_sections_alone() {
    let store = MemStore::default();
    let mut p = payload();
    p.sections.household_sensitization = Some(sensitization(2));
    let created = sync_create(&store, p).await.unwrap();

    let patch = InterviewPatch {
      cover:    CoverPatch {
        risk_classification: Some("High".into()),
        ..CoverPatch::default()
      },
      sections: Sections::default(),
    };
    let updated =
      sync_update(&store, created.cover.cover_id, patch).await.unwrap();

    assert_eq!(updated.cover.risk_classification, "High");
    assert_eq!(updated.cover.farmer_code, created.cover.farmer_code);
    assert_eq!(
      updated.sections.household_sensitization,
      created.sections.household_sensitization,
      "untouched section must survive a partial update"
    );
  }

  #[tokio::test]
  async fn sync_response_round_trips_as_update() {
    let store = MemStore::default();
    let mut p = payload();
    p.sections.household_sensitization = Some(sensitization(2));
    let created = sync_create(&store, p).await.unwrap();

    // Feed the response back, exactly as serialised on the wire.
    let json = serde_json::to_value(&created).unwrap();
    let patch: InterviewPatch = serde_json::from_value(json).unwrap();
    let updated =
      sync_update(&store, created.cover.cover_id, patch).await.unwrap();

    assert_eq!(updated, created, "round-trip must produce no diff");
  }
}
