//! Closing sections: remediation measures, household sensitization, and the
//! end-of-collection wrap-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SectionData, YesNo};
use crate::validate::{
  CAPITALS_SPACES, ValidationReport, match_if_present, require_answer,
  require_nonempty, scoped,
};

// ─── Child remediation ───────────────────────────────────────────────────────

/// Support proposed for the parent to stop involving children in child
/// labour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentRemediation {
  ChildProtection,
  SchoolKits,
  IgaSupport,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityRemediation {
  CommunityEducation,
  SchoolBuilding,
  SchoolRenovation,
  Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRemediation {
  /// Does the household owe school fees for its children?
  pub school_fees_owed:            YesNo,
  pub parent_remediation:          ParentRemediation,
  /// Specified in capitals when `parent_remediation` is `other`.
  #[serde(default)]
  pub parent_remediation_other:    Option<String>,
  pub community_remediation:       CommunityRemediation,
  #[serde(default)]
  pub community_remediation_other: Option<String>,
}

impl SectionData for ChildRemediation {
  const KEY: &'static str = "child_remediation";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    if self.parent_remediation == ParentRemediation::Other {
      require_answer(
        report,
        scoped(prefix, "parent_remediation_other"),
        self.parent_remediation_other.as_deref(),
        "when the parent remediation is other",
      );
    }
    if self.community_remediation == CommunityRemediation::Other {
      require_answer(
        report,
        scoped(prefix, "community_remediation_other"),
        self.community_remediation_other.as_deref(),
        "when the community remediation is other",
      );
    }
    for (field, value) in [
      (
        "parent_remediation_other",
        self.parent_remediation_other.as_deref(),
      ),
      (
        "community_remediation_other",
        self.community_remediation_other.as_deref(),
      ),
    ] {
      match_if_present(
        report,
        scoped(prefix, field),
        value,
        &CAPITALS_SPACES,
        "must be in capital letters",
      );
    }
  }
}

// ─── Household sensitization ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdSensitization {
  pub sensitized_good_parenting:   YesNo,
  pub sensitized_child_protection: YesNo,
  pub sensitized_safe_labour:      YesNo,
  /// Female adults present during the sensitization; at least one.
  pub number_of_female_adults:     u32,
  /// Male adults present during the sensitization; at least one.
  pub number_of_male_adults:       u32,
  pub picture_of_respondent:       YesNo,
  #[serde(default)]
  pub feedback_observations:       Option<String>,
}

impl SectionData for HouseholdSensitization {
  const KEY: &'static str = "household_sensitization";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    if self.number_of_female_adults < 1 {
      report.push(
        scoped(prefix, "number_of_female_adults"),
        "at least one female adult must be present",
      );
    }
    if self.number_of_male_adults < 1 {
      report.push(
        scoped(prefix, "number_of_male_adults"),
        "at least one male adult must be present",
      );
    }
  }
}

// ─── End of collection ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndOfCollection {
  /// Feedback from the enumerator; always required.
  pub feedback_enum: String,
  #[serde(default)]
  pub end_gps:       Option<String>,
  #[serde(default)]
  pub end_time:      Option<DateTime<Utc>>,
}

impl SectionData for EndOfCollection {
  const KEY: &'static str = "end_of_collection";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    require_nonempty(
      report,
      scoped(prefix, "feedback_enum"),
      &self.feedback_enum,
    );
  }
}
