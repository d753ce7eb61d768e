//! Consent and location — the first section captured after the cover.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SectionData, YesNo};
use crate::validate::{
  CAPITALS, ValidationReport, match_if_present, require_answer,
  require_nonempty, scoped,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunityType {
  Town,
  Village,
  Camp,
}

/// Why the farmer could not be interviewed in person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
  #[serde(rename = "Non-resident")]
  NonResident,
  Deceased,
  #[serde(rename = "No longer works with the client")]
  NoLongerWithClient,
  Other,
}

/// Who answers in the farmer's place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerBy {
  Caretaker,
  Spouse,
  Nobody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentLocation {
  pub interview_start_time:        DateTime<Utc>,
  /// GPS point of the household, as captured by the collection device.
  pub gps_point:                   String,
  pub community_type:              CommunityType,
  pub farmer_resides_in_community: YesNo,
  /// Required when the farmer does not reside in the cover community.
  /// Captured in capitals on the paper form.
  #[serde(default)]
  pub community_name:              Option<String>,
  #[serde(default)]
  pub farmer_available:            Option<YesNo>,
  #[serde(default)]
  pub reason_unavailable:          Option<UnavailableReason>,
  #[serde(default)]
  pub reason_unavailable_other:    Option<String>,
  #[serde(default)]
  pub available_answer_by:         Option<AnswerBy>,
}

impl SectionData for ConsentLocation {
  const KEY: &'static str = "consent_location";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    require_nonempty(report, scoped(prefix, "gps_point"), &self.gps_point);

    if self.farmer_resides_in_community == YesNo::No {
      require_answer(
        report,
        scoped(prefix, "community_name"),
        self.community_name.as_deref(),
        "when the farmer does not reside in the cover community",
      );
    }
    match_if_present(
      report,
      scoped(prefix, "community_name"),
      self.community_name.as_deref(),
      &CAPITALS,
      "must be in capital letters without special characters",
    );

    if self.farmer_available == Some(YesNo::No) {
      if self.reason_unavailable.is_none() {
        report.push(
          scoped(prefix, "reason_unavailable"),
          "this field is required when the farmer is unavailable",
        );
      }
      if self.available_answer_by.is_none() {
        report.push(
          scoped(prefix, "available_answer_by"),
          "this field is required when the farmer is unavailable",
        );
      }
    }
    if self.reason_unavailable == Some(UnavailableReason::Other) {
      require_answer(
        report,
        scoped(prefix, "reason_unavailable_other"),
        self.reason_unavailable_other.as_deref(),
        "when the unavailability reason is Other",
      );
    }
  }
}
