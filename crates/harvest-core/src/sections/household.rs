//! Household composition sections: the adults of the respondent's household
//! and the child labour assessment for one child aged 5–17.

use serde::{Deserialize, Serialize};

use super::{
  CountryOfOrigin, Gender, Nationality, SectionData, YesNo,
  identification::validate_origin,
};
use crate::validate::{
  LETTERS_SPACES, NAME_CHARS, ValidationReport, match_if_present,
  require_answer, require_between, require_match, scoped,
};

// ─── Adults ──────────────────────────────────────────────────────────────────

/// Relationship of a household member to the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
  #[serde(rename = "Husband/Wife")]
  Spouse,
  #[serde(rename = "Son/Daughter")]
  Child,
  #[serde(rename = "Brother/Sister")]
  Sibling,
  #[serde(rename = "Son-in-law/Daughter-in-law")]
  ChildInLaw,
  #[serde(rename = "Grandson/Granddaughter")]
  Grandchild,
  #[serde(rename = "Niece/Nephew")]
  NieceNephew,
  Cousin,
  #[serde(rename = "Worker's Family")]
  WorkersFamily,
  Worker,
  #[serde(rename = "Father/Mother")]
  Parent,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainWork {
  #[serde(rename = "Farmer_cocoa")]
  FarmerCocoa,
  #[serde(rename = "Farmer_coffee")]
  FarmerCoffee,
  #[serde(rename = "Farmer_other")]
  FarmerOther,
  Merchant,
  Student,
  Other,
  #[serde(rename = "No_activity")]
  NoActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdultInHousehold {
  /// Adults dwelling under the same roof and sharing the same meal,
  /// producer/manager/owner not included.
  pub total_adults:         u32,
  /// Full names of household members; accents are not allowed.
  #[serde(default)]
  pub full_names:           Vec<String>,
  pub relationship:         Relationship,
  #[serde(default)]
  pub relationship_other:   Option<String>,
  pub gender:               Gender,
  pub nationality:          Nationality,
  #[serde(default)]
  pub country_origin:       Option<CountryOfOrigin>,
  #[serde(default)]
  pub country_origin_other: Option<String>,
  pub year_birth:           i32,
  pub birth_certificate:    YesNo,
  pub main_work:            MainWork,
  #[serde(default)]
  pub main_work_other:      Option<String>,
}

impl SectionData for AdultInHousehold {
  const KEY: &'static str = "adult_in_household";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    for (i, name) in self.full_names.iter().enumerate() {
      require_match(
        report,
        scoped(prefix, &format!("full_names[{i}]")),
        name,
        &NAME_CHARS,
        "only letters, numbers, spaces and apostrophes are allowed",
      );
    }
    if self.relationship == Relationship::Other {
      require_answer(
        report,
        scoped(prefix, "relationship_other"),
        self.relationship_other.as_deref(),
        "when the relationship is Other",
      );
    }
    validate_origin(
      prefix,
      report,
      self.nationality,
      self.country_origin,
      self.country_origin_other.as_deref(),
      "country_origin",
      "country_origin_other",
    );
    require_between(
      report,
      scoped(prefix, "year_birth"),
      i64::from(self.year_birth),
      1910,
      2007,
    );
    if self.main_work == MainWork::Other {
      require_answer(
        report,
        scoped(prefix, "main_work_other"),
        self.main_work_other.as_deref(),
        "when the main work is Other",
      );
    }
  }
}

// ─── Children ────────────────────────────────────────────────────────────────

/// Why a child of the household could not be surveyed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildUnavailabilityReason {
  #[serde(rename = "At school")]
  AtSchool,
  Travelled,
  Sick,
  Working,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchoolingStatus {
  Attending,
  #[serde(rename = "Left school")]
  LeftSchool,
  #[serde(rename = "Never attended")]
  NeverAttended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchoolType {
  Public,
  Private,
}

/// How often the child works on the cocoa farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkFrequency {
  Daily,
  Weekly,
  #[serde(rename = "Only on holidays")]
  OnlyHolidays,
  Rarely,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskLocation {
  #[serde(rename = "Family farm")]
  FamilyFarm,
  #[serde(rename = "Neighbour's farm")]
  NeighboursFarm,
  Household,
  Other,
}

/// Light-duty hours in the past 7 days must stay below this bound; the
/// collection device caps the answer there.
const MAX_WEEKLY_HOURS: i64 = 1015;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildInHousehold {
  pub children_present:          bool,
  /// Children aged 5–17 in the household.
  pub num_children_5_to_17:      u32,
  /// Position of this child in the cover's children list.
  pub child_identifier:          u32,
  pub child_can_be_surveyed:     bool,
  #[serde(default)]
  pub child_unavailability_reason: Option<ChildUnavailabilityReason>,
  pub child_first_name:          String,
  pub child_surname:             String,
  pub child_gender:              Gender,
  pub child_year_birth:          i32,
  pub child_birth_certificate:   YesNo,

  // Schooling.
  pub schooling_status:          SchoolingStatus,
  #[serde(default)]
  pub child_school_name:         Option<String>,
  #[serde(default)]
  pub school_type:               Option<SchoolType>,
  #[serde(default)]
  pub child_grade:               Option<String>,
  #[serde(default)]
  pub child_school_left_reason:  Option<String>,
  #[serde(default)]
  pub child_never_school_reason: Option<String>,

  // Work.
  pub work_in_house:             YesNo,
  pub work_on_cocoa:             YesNo,
  #[serde(default)]
  pub work_frequency:            Option<WorkFrequency>,
  #[serde(default)]
  pub performed_tasks:           Option<String>,
  #[serde(default)]
  pub task_location:             Option<TaskLocation>,
  #[serde(default)]
  pub task_location_other:       Option<String>,
  /// Hours of light work during school days in the past 7 days.
  pub total_hours_light_work_school: u32,
  /// Hours of light work during non-school days in the past 7 days.
  pub total_hours_light_work_non_school: u32,
  pub under_supervision:         YesNo,
}

impl SectionData for ChildInHousehold {
  const KEY: &'static str = "child_in_household";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    require_between(
      report,
      scoped(prefix, "num_children_5_to_17"),
      i64::from(self.num_children_5_to_17),
      1,
      19,
    );
    require_between(
      report,
      scoped(prefix, "child_identifier"),
      i64::from(self.child_identifier),
      1,
      19,
    );
    if !self.child_can_be_surveyed
      && self.child_unavailability_reason.is_none()
    {
      report.push(
        scoped(prefix, "child_unavailability_reason"),
        "this field is required when the child cannot be surveyed",
      );
    }
    for (field, value) in [
      ("child_first_name", &self.child_first_name),
      ("child_surname", &self.child_surname),
    ] {
      require_match(
        report,
        scoped(prefix, field),
        value,
        &LETTERS_SPACES,
        "must contain only letters and spaces",
      );
    }
    require_between(
      report,
      scoped(prefix, "child_year_birth"),
      i64::from(self.child_year_birth),
      2007,
      2020,
    );

    match self.schooling_status {
      SchoolingStatus::Attending => {
        require_answer(
          report,
          scoped(prefix, "child_school_name"),
          self.child_school_name.as_deref(),
          "when the child attends school",
        );
        if self.school_type.is_none() {
          report.push(
            scoped(prefix, "school_type"),
            "this field is required when the child attends school",
          );
        }
      }
      SchoolingStatus::LeftSchool => require_answer(
        report,
        scoped(prefix, "child_school_left_reason"),
        self.child_school_left_reason.as_deref(),
        "when the child left school",
      ),
      SchoolingStatus::NeverAttended => require_answer(
        report,
        scoped(prefix, "child_never_school_reason"),
        self.child_never_school_reason.as_deref(),
        "when the child never attended school",
      ),
    }

    if self.task_location == Some(TaskLocation::Other) {
      require_answer(
        report,
        scoped(prefix, "task_location_other"),
        self.task_location_other.as_deref(),
        "when the task location is Other",
      );
    }
    match_if_present(
      report,
      scoped(prefix, "performed_tasks"),
      self.performed_tasks.as_deref(),
      &NAME_CHARS,
      "only letters, numbers, spaces and apostrophes are allowed",
    );
    require_between(
      report,
      scoped(prefix, "total_hours_light_work_school"),
      i64::from(self.total_hours_light_work_school),
      0,
      MAX_WEEKLY_HOURS,
    );
    require_between(
      report,
      scoped(prefix, "total_hours_light_work_non_school"),
      i64::from(self.total_hours_light_work_non_school),
      0,
      MAX_WEEKLY_HOURS,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn adult() -> AdultInHousehold {
    AdultInHousehold {
      total_adults:         3,
      full_names:           vec!["Yaw Boateng".into(), "Ama Serwaa".into()],
      relationship:         Relationship::Spouse,
      relationship_other:   None,
      gender:               Gender::Female,
      nationality:          Nationality::Ghanaian,
      country_origin:       None,
      country_origin_other: None,
      year_birth:           1985,
      birth_certificate:    YesNo::Yes,
      main_work:            MainWork::FarmerCocoa,
      main_work_other:      None,
    }
  }

  fn child() -> ChildInHousehold {
    ChildInHousehold {
      children_present:          true,
      num_children_5_to_17:      2,
      child_identifier:          1,
      child_can_be_surveyed:     true,
      child_unavailability_reason: None,
      child_first_name:          "Ama".into(),
      child_surname:             "Mensah".into(),
      child_gender:              Gender::Female,
      child_year_birth:          2012,
      child_birth_certificate:   YesNo::Yes,
      schooling_status:          SchoolingStatus::Attending,
      child_school_name:         Some("Besease Primary".into()),
      school_type:               Some(SchoolType::Public),
      child_grade:               Some("Primary 4".into()),
      child_school_left_reason:  None,
      child_never_school_reason: None,
      work_in_house:             YesNo::Yes,
      work_on_cocoa:             YesNo::No,
      work_frequency:            None,
      performed_tasks:           None,
      task_location:             None,
      task_location_other:       None,
      total_hours_light_work_school: 2,
      total_hours_light_work_non_school: 5,
      under_supervision:         YesNo::Yes,
    }
  }

  #[test]
  fn valid_sections_pass() {
    let mut report = ValidationReport::new();
    adult().validate(AdultInHousehold::KEY, &mut report);
    child().validate(ChildInHousehold::KEY, &mut report);
    assert!(report.is_empty(), "{report:?}");
  }

  #[test]
  fn adult_year_of_birth_is_bounded() {
    let mut s = adult();
    s.year_birth = 2015;
    let mut report = ValidationReport::new();
    s.validate(AdultInHousehold::KEY, &mut report);
    assert!(report.field("adult_in_household.year_birth").is_some());
  }

  #[test]
  fn accented_household_names_are_flagged_individually() {
    let mut s = adult();
    s.full_names = vec!["Yaw Boateng".into(), "Kofí".into()];
    let mut report = ValidationReport::new();
    s.validate(AdultInHousehold::KEY, &mut report);
    assert!(report.field("adult_in_household.full_names[0]").is_none());
    assert!(report.field("adult_in_household.full_names[1]").is_some());
  }

  #[test]
  fn weekly_hours_upper_bound_is_exclusive_of_1016() {
    let mut s = child();
    s.total_hours_light_work_school = 1015;
    let mut report = ValidationReport::new();
    s.validate(ChildInHousehold::KEY, &mut report);
    assert!(report.is_empty());

    s.total_hours_light_work_school = 1016;
    let mut report = ValidationReport::new();
    s.validate(ChildInHousehold::KEY, &mut report);
    assert!(
      report
        .field("child_in_household.total_hours_light_work_school")
        .is_some()
    );
  }

  #[test]
  fn unsurveyable_child_needs_a_reason() {
    let mut s = child();
    s.child_can_be_surveyed = false;
    let mut report = ValidationReport::new();
    s.validate(ChildInHousehold::KEY, &mut report);
    assert!(
      report
        .field("child_in_household.child_unavailability_reason")
        .is_some()
    );
  }

  #[test]
  fn schooling_conditionals() {
    let mut s = child();
    s.schooling_status = SchoolingStatus::LeftSchool;
    s.child_school_name = None;
    s.school_type = None;
    let mut report = ValidationReport::new();
    s.validate(ChildInHousehold::KEY, &mut report);
    assert!(
      report
        .field("child_in_household.child_school_left_reason")
        .is_some()
    );
    assert!(report.field("child_in_household.child_school_name").is_none());
  }

  #[test]
  fn out_of_range_child_count() {
    let mut s = child();
    s.num_children_5_to_17 = 0;
    let mut report = ValidationReport::new();
    s.validate(ChildInHousehold::KEY, &mut report);
    assert!(
      report.field("child_in_household.num_children_5_to_17").is_some()
    );
  }
}
