//! Cover — the root record of one farmer interview.
//!
//! A cover identifies the enumerator, the location, and the farmer being
//! interviewed. Every section record hangs off a cover through its
//! `cover_id`; the three code fields are unique across the store and stable
//! once set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  code::{
    ENUMERATOR_PREFIX, FARMER_PREFIX, SOCIETY_PREFIX, generate_code,
  },
  validate::{
    LETTERS_ONLY, LETTERS_SPACES, ValidationReport, match_if_present,
    require_match, require_nonempty, scoped,
  },
};

// ─── Stored record ───────────────────────────────────────────────────────────

/// A fully persisted cover record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cover {
  pub cover_id:            Uuid,
  pub created_at:          DateTime<Utc>,
  pub enumerator_name:     String,
  pub enumerator_code:     String,
  pub country:             String,
  pub region:              String,
  pub district:            String,
  pub society:             String,
  pub society_code:        String,
  pub farmer_code:         String,
  pub farmer_surname:      String,
  pub farmer_first_name:   String,
  pub risk_classification: String,
  pub client:              String,
  pub num_farmer_children: u32,
  /// Free-text, comma-separated list of children aged 5–17 in the household.
  #[serde(default)]
  pub list_children:       String,
}

// ─── Creation input ──────────────────────────────────────────────────────────

/// Input for creating a cover. The three code fields are optional; missing
/// (or blank) ones are derived from the corresponding name before the write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCover {
  pub enumerator_name:     String,
  #[serde(default)]
  pub enumerator_code:     Option<String>,
  pub country:             String,
  pub region:              String,
  pub district:            String,
  pub society:             String,
  #[serde(default)]
  pub society_code:        Option<String>,
  #[serde(default)]
  pub farmer_code:         Option<String>,
  pub farmer_surname:      String,
  pub farmer_first_name:   String,
  pub risk_classification: String,
  pub client:              String,
  pub num_farmer_children: u32,
  #[serde(default)]
  pub list_children:       String,
}

fn supplied(code: &Option<String>) -> bool {
  matches!(code, Some(c) if !c.trim().is_empty())
}

impl NewCover {
  pub fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    require_nonempty(
      report,
      scoped(prefix, "enumerator_name"),
      &self.enumerator_name,
    );
    for (field, value) in [
      ("country", &self.country),
      ("region", &self.region),
      ("district", &self.district),
    ] {
      require_match(
        report,
        scoped(prefix, field),
        value,
        &LETTERS_ONLY,
        "must contain only letters (no spaces)",
      );
    }
    require_nonempty(report, scoped(prefix, "society"), &self.society);
    for (field, value) in [
      ("farmer_surname", &self.farmer_surname),
      ("farmer_first_name", &self.farmer_first_name),
    ] {
      require_match(
        report,
        scoped(prefix, field),
        value,
        &LETTERS_SPACES,
        "must contain only letters and spaces",
      );
    }
    require_nonempty(
      report,
      scoped(prefix, "risk_classification"),
      &self.risk_classification,
    );
    require_nonempty(report, scoped(prefix, "client"), &self.client);
  }

  /// Which code fields will be derived rather than taken from the caller.
  pub fn derived_codes(&self) -> DerivedCodes {
    DerivedCodes {
      enumerator: !supplied(&self.enumerator_code),
      society:    !supplied(&self.society_code),
      farmer:     !supplied(&self.farmer_code),
    }
  }

  /// Materialise a full [`Cover`]: assign an id and timestamp, and derive
  /// any code field the caller left blank. Populated codes pass through
  /// untouched — derivation never overwrites.
  pub fn into_cover(self) -> Cover {
    let enumerator_code = match self.enumerator_code {
      Some(c) if !c.trim().is_empty() => c,
      _ => generate_code(&self.enumerator_name, ENUMERATOR_PREFIX),
    };
    let society_code = match self.society_code {
      Some(c) if !c.trim().is_empty() => c,
      _ => generate_code(&self.society, SOCIETY_PREFIX),
    };
    let farmer_code = match self.farmer_code {
      Some(c) if !c.trim().is_empty() => c,
      _ => generate_code(&self.farmer_first_name, FARMER_PREFIX),
    };

    Cover {
      cover_id: Uuid::new_v4(),
      created_at: Utc::now(),
      enumerator_name: self.enumerator_name,
      enumerator_code,
      country: self.country,
      region: self.region,
      district: self.district,
      society: self.society,
      society_code,
      farmer_code,
      farmer_surname: self.farmer_surname,
      farmer_first_name: self.farmer_first_name,
      risk_classification: self.risk_classification,
      client: self.client,
      num_farmer_children: self.num_farmer_children,
      list_children: self.list_children,
    }
  }
}

// ─── Derived-code bookkeeping ────────────────────────────────────────────────

/// Records which of a cover's codes were derived by us rather than supplied
/// by the caller. A unique-constraint collision on a derived code can be
/// resolved by re-deriving with a fresh salt; a collision on a supplied code
/// must surface to the caller.
#[derive(Debug, Clone, Copy)]
pub struct DerivedCodes {
  pub enumerator: bool,
  pub society:    bool,
  pub farmer:     bool,
}

impl DerivedCodes {
  /// Re-derive the code behind the colliding `column`, if we derived it.
  /// Returns `false` when the column is not a code column or the value came
  /// from the caller.
  pub fn rederive(&self, column: &str, cover: &mut Cover) -> bool {
    match column {
      "enumerator_code" if self.enumerator => {
        cover.enumerator_code =
          generate_code(&cover.enumerator_name, ENUMERATOR_PREFIX);
        true
      }
      "society_code" if self.society => {
        cover.society_code = generate_code(&cover.society, SOCIETY_PREFIX);
        true
      }
      "farmer_code" if self.farmer => {
        cover.farmer_code =
          generate_code(&cover.farmer_first_name, FARMER_PREFIX);
        true
      }
      _ => false,
    }
  }
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// Partial update of a cover: fields present overwrite, fields absent stay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverPatch {
  pub enumerator_name:     Option<String>,
  pub enumerator_code:     Option<String>,
  pub country:             Option<String>,
  pub region:              Option<String>,
  pub district:            Option<String>,
  pub society:             Option<String>,
  pub society_code:        Option<String>,
  pub farmer_code:         Option<String>,
  pub farmer_surname:      Option<String>,
  pub farmer_first_name:   Option<String>,
  pub risk_classification: Option<String>,
  pub client:              Option<String>,
  pub num_farmer_children: Option<u32>,
  pub list_children:       Option<String>,
}

impl CoverPatch {
  pub fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    for (field, value) in [
      ("country", &self.country),
      ("region", &self.region),
      ("district", &self.district),
    ] {
      match_if_present(
        report,
        scoped(prefix, field),
        value.as_deref(),
        &LETTERS_ONLY,
        "must contain only letters (no spaces)",
      );
    }
    for (field, value) in [
      ("farmer_surname", &self.farmer_surname),
      ("farmer_first_name", &self.farmer_first_name),
    ] {
      match_if_present(
        report,
        scoped(prefix, field),
        value.as_deref(),
        &LETTERS_SPACES,
        "must contain only letters and spaces",
      );
    }
  }

  /// Overlay the present fields onto `cover`.
  pub fn apply(&self, cover: &mut Cover) {
    macro_rules! set {
      ($field:ident) => {
        if let Some(v) = &self.$field {
          cover.$field = v.clone();
        }
      };
    }
    set!(enumerator_name);
    set!(enumerator_code);
    set!(country);
    set!(region);
    set!(district);
    set!(society);
    set!(society_code);
    set!(farmer_code);
    set!(farmer_surname);
    set!(farmer_first_name);
    set!(risk_classification);
    set!(client);
    if let Some(v) = self.num_farmer_children {
      cover.num_farmer_children = v;
    }
    set!(list_children);
  }
}
