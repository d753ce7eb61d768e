//! The nine one-to-one section record types attached to a cover.
//!
//! Each section is an independent bag of typed, constrained fields. None has
//! children of its own: the entity graph is strictly cover-with-up-to-nine
//! sections, depth 2. Choice fields are Rust enums; a value outside the
//! enumeration is rejected at deserialisation as a malformed payload, while
//! regex, range and cross-field rules report through
//! [`ValidationReport`](crate::validate::ValidationReport).

mod closing;
mod consent;
mod household;
mod identification;
mod labour;

pub use closing::{
  ChildRemediation, CommunityRemediation, EndOfCollection,
  HouseholdSensitization, ParentRemediation,
};
pub use consent::{
  AnswerBy, CommunityType, ConsentLocation, UnavailableReason,
};
pub use household::{
  AdultInHousehold, ChildInHousehold, ChildUnavailabilityReason, MainWork,
  Relationship, SchoolType, SchoolingStatus, TaskLocation, WorkFrequency,
};
pub use identification::{
  FarmerIdentification, OwnerIdentification, OwnerStatus,
};
pub use labour::{
  AgreementKind, Attitude, RecruitmentKind, RefusalAction, SalaryStatus,
  WorkerInFarm,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::validate::ValidationReport;

// ─── Shared choice enums ─────────────────────────────────────────────────────

/// Yes/no answer captured as a survey choice (distinct from `bool` fields,
/// which the collection device records as checkboxes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
  Yes,
  No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nationality {
  Ghanaian,
  #[serde(rename = "Non Ghanaian")]
  NonGhanaian,
}

/// Country of origin for non-Ghanaian respondents and household members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountryOfOrigin {
  #[serde(rename = "Burkina Faso")]
  BurkinaFaso,
  Mali,
  Guinea,
  #[serde(rename = "Ivory Coast")]
  IvoryCoast,
  Liberia,
  Togo,
  Benin,
  Niger,
  Nigeria,
  Other,
}

// ─── Section trait ───────────────────────────────────────────────────────────

/// A section payload type.
///
/// `KEY` doubles as the key under which the section appears in nested sync
/// payloads and as the name of its backing table; storage backends key their
/// generic section operations on it.
pub trait SectionData:
  Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
  const KEY: &'static str;

  /// Record rule violations under `prefix`-scoped field paths.
  fn validate(&self, prefix: &str, report: &mut ValidationReport);
}

/// A persisted section row: payload plus its identity and cover link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord<T> {
  pub section_id:  Uuid,
  pub cover_id:    Uuid,
  pub recorded_at: DateTime<Utc>,
  #[serde(flatten)]
  pub data:        T,
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// The optional section payloads of one interview, keyed the way the nested
/// sync payload spells them. Flattened into payload, patch and response
/// types alike so the sync response round-trips as an update payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub consent_location:       Option<ConsentLocation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub farmer_identification:  Option<FarmerIdentification>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub owner_identification:   Option<OwnerIdentification>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub worker_in_farm:         Option<WorkerInFarm>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub adult_in_household:     Option<AdultInHousehold>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub child_in_household:     Option<ChildInHousehold>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub child_remediation:      Option<ChildRemediation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub household_sensitization: Option<HouseholdSensitization>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_of_collection:      Option<EndOfCollection>,
}

macro_rules! for_each_section {
  ($macro:ident) => {
    $macro!(consent_location, ConsentLocation);
    $macro!(farmer_identification, FarmerIdentification);
    $macro!(owner_identification, OwnerIdentification);
    $macro!(worker_in_farm, WorkerInFarm);
    $macro!(adult_in_household, AdultInHousehold);
    $macro!(child_in_household, ChildInHousehold);
    $macro!(child_remediation, ChildRemediation);
    $macro!(household_sensitization, HouseholdSensitization);
    $macro!(end_of_collection, EndOfCollection);
  };
}

impl Sections {
  /// Every section key, in payload order. Storage backends iterate this to
  /// create tables and read interviews.
  pub const KEYS: [&'static str; 9] = [
    ConsentLocation::KEY,
    FarmerIdentification::KEY,
    OwnerIdentification::KEY,
    WorkerInFarm::KEY,
    AdultInHousehold::KEY,
    ChildInHousehold::KEY,
    ChildRemediation::KEY,
    HouseholdSensitization::KEY,
    EndOfCollection::KEY,
  ];

  /// Validate every present section under its own key prefix.
  pub fn validate(&self, report: &mut ValidationReport) {
    macro_rules! validate_one {
      ($field:ident, $ty:ident) => {
        if let Some(section) = &self.$field {
          section.validate($ty::KEY, report);
        }
      };
    }
    for_each_section!(validate_one);
  }

  /// Serialise the present sections to `(key, json)` pairs, in key order.
  pub fn present(
    &self,
  ) -> Result<Vec<(&'static str, serde_json::Value)>, serde_json::Error> {
    let mut out = Vec::new();
    macro_rules! collect_one {
      ($field:ident, $ty:ident) => {
        if let Some(section) = &self.$field {
          out.push(($ty::KEY, serde_json::to_value(section)?));
        }
      };
    }
    for_each_section!(collect_one);
    Ok(out)
  }

  /// Install a raw JSON payload under `key`. Returns `false` for an unknown
  /// key; a payload that does not match the section's schema is an error.
  pub fn insert_raw(
    &mut self,
    key: &str,
    value: serde_json::Value,
  ) -> Result<bool, serde_json::Error> {
    macro_rules! install_one {
      ($field:ident, $ty:ident) => {
        if key == $ty::KEY {
          self.$field = Some(serde_json::from_value(value)?);
          return Ok(true);
        }
      };
    }
    for_each_section!(install_one);
    Ok(false)
  }

  /// Overlay the sections present in `other` onto `self`, leaving the rest
  /// unchanged — the partial-update rule for nested sync.
  pub fn merge(&mut self, other: Sections) {
    macro_rules! merge_one {
      ($field:ident, $ty:ident) => {
        if let Some(section) = other.$field {
          self.$field = Some(section);
        }
      };
    }
    for_each_section!(merge_one);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_are_distinct_and_snake_case() {
    for key in Sections::KEYS {
      assert!(key.chars().all(|c| c == '_' || c.is_ascii_lowercase()));
    }
    let mut keys = Sections::KEYS.to_vec();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), 9);
  }

  #[test]
  fn insert_raw_rejects_unknown_keys() {
    let mut sections = Sections::default();
    let installed = sections
      .insert_raw("no_such_section", serde_json::json!({}))
      .unwrap();
    assert!(!installed);
  }

  #[test]
  fn present_and_insert_raw_round_trip() {
    let mut sections = Sections::default();
    sections.household_sensitization = Some(HouseholdSensitization {
      sensitized_good_parenting:   YesNo::Yes,
      sensitized_child_protection: YesNo::Yes,
      sensitized_safe_labour:      YesNo::No,
      number_of_female_adults:     2,
      number_of_male_adults:       1,
      picture_of_respondent:       YesNo::Yes,
      feedback_observations:       None,
    });

    let pairs = sections.present().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, "household_sensitization");

    let mut rebuilt = Sections::default();
    for (key, value) in pairs {
      assert!(rebuilt.insert_raw(key, value).unwrap());
    }
    assert_eq!(rebuilt, sections);
  }

  #[test]
  fn merge_overlays_only_present_sections() {
    let mut base = Sections::default();
    base.end_of_collection = Some(EndOfCollection {
      feedback_enum: "smooth interview".into(),
      end_gps:       None,
      end_time:      None,
    });

    let mut patch = Sections::default();
    patch.child_remediation = Some(ChildRemediation {
      school_fees_owed:            YesNo::No,
      parent_remediation:          ParentRemediation::SchoolKits,
      parent_remediation_other:    None,
      community_remediation:       CommunityRemediation::CommunityEducation,
      community_remediation_other: None,
    });

    base.merge(patch);
    assert!(base.end_of_collection.is_some(), "existing section kept");
    assert!(base.child_remediation.is_some(), "new section added");
  }
}
