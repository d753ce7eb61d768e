//! Farmer and owner identification sections.

use serde::{Deserialize, Serialize};

use super::{CountryOfOrigin, Nationality, SectionData, YesNo};
use crate::validate::{
  LETTERS_APOSTROPHES, NAME_CHARS, ValidationReport, match_if_present,
  require_answer, scoped,
};

// ─── Farmer identification ───────────────────────────────────────────────────

/// How the respondent relates to the farm they answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerStatus {
  #[serde(rename = "Complete Owner")]
  CompleteOwner,
  Sharecropper,
  #[serde(rename = "Owner/Sharecropper")]
  OwnerSharecropper,
  #[serde(rename = "Caretaker/Manager of the farm")]
  Caretaker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerIdentification {
  /// Is the name of the respondent correct as printed on the cover?
  pub is_name_correct:      YesNo,
  /// Exact name and surname of the producer when the cover name is wrong.
  #[serde(default)]
  pub exact_name:           Option<String>,
  pub nationality:          Nationality,
  #[serde(default)]
  pub country_origin:       Option<CountryOfOrigin>,
  #[serde(default)]
  pub country_origin_other: Option<String>,
  /// Is the respondent the owner of the farm?
  pub is_owner:             YesNo,
  #[serde(default)]
  pub owner_status:         Option<OwnerStatus>,
}

impl SectionData for FarmerIdentification {
  const KEY: &'static str = "farmer_identification";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    if self.is_name_correct == YesNo::No {
      require_answer(
        report,
        scoped(prefix, "exact_name"),
        self.exact_name.as_deref(),
        "when the respondent name is incorrect",
      );
    }
    match_if_present(
      report,
      scoped(prefix, "exact_name"),
      self.exact_name.as_deref(),
      &NAME_CHARS,
      "only letters, numbers, spaces and apostrophes are allowed",
    );
    validate_origin(
      prefix,
      report,
      self.nationality,
      self.country_origin,
      self.country_origin_other.as_deref(),
      "country_origin",
      "country_origin_other",
    );
  }
}

// ─── Owner identification ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerIdentification {
  /// Owner's surname; letters and apostrophes only, no spaces.
  #[serde(default)]
  pub owner_surname:              Option<String>,
  #[serde(default)]
  pub owner_first_name:           Option<String>,
  pub owner_nationality:          Nationality,
  #[serde(default)]
  pub owner_country_origin:       Option<CountryOfOrigin>,
  #[serde(default)]
  pub owner_country_origin_other: Option<String>,
  /// Years the respondent has been working for the owner.
  pub manager_work_length:        u32,
}

impl SectionData for OwnerIdentification {
  const KEY: &'static str = "owner_identification";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    for (field, value) in [
      ("owner_surname", self.owner_surname.as_deref()),
      ("owner_first_name", self.owner_first_name.as_deref()),
    ] {
      match_if_present(
        report,
        scoped(prefix, field),
        value,
        &LETTERS_APOSTROPHES,
        "must contain only letters and apostrophes (no spaces)",
      );
    }
    validate_origin(
      prefix,
      report,
      self.owner_nationality,
      self.owner_country_origin,
      self.owner_country_origin_other.as_deref(),
      "owner_country_origin",
      "owner_country_origin_other",
    );
  }
}

/// Shared rule: non-Ghanaians must name a country of origin, and `Other`
/// must be spelled out.
pub(super) fn validate_origin(
  prefix: &str,
  report: &mut ValidationReport,
  nationality: Nationality,
  country: Option<CountryOfOrigin>,
  other: Option<&str>,
  country_field: &str,
  other_field: &str,
) {
  if nationality == Nationality::NonGhanaian && country.is_none() {
    report.push(
      scoped(prefix, country_field),
      "this field is required for non-Ghanaian respondents",
    );
  }
  if country == Some(CountryOfOrigin::Other) {
    require_answer(
      report,
      scoped(prefix, other_field),
      other,
      "when the country of origin is Other",
    );
  }
}
