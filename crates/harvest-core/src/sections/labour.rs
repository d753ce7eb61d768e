//! Workers-in-the-farm section: recruitment practice and the forced-labour
//! attitude battery.

use serde::{Deserialize, Serialize};

use super::SectionData;
use crate::validate::{ValidationReport, require_answer, scoped};

/// Agree/disagree answers are captured with the paper form's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attitude {
  #[serde(rename = "01")]
  Agree,
  #[serde(rename = "02")]
  Disagree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementKind {
  VerbalWithoutWitness,
  VerbalWithWitness,
  WrittenWithoutWitness,
  WrittenWithWitness,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecruitmentKind {
  Permanent,
  Casual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalaryStatus {
  Always,
  Sometimes,
  Rarely,
  Never,
}

/// What the employer does when a worker refuses a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefusalAction {
  Compromise,
  SalaryDeduction,
  Warning,
  Other,
  NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInFarm {
  /// Recruited at least one worker during the past year.
  pub recruited_workers:       bool,
  pub worker_recruitment_type: RecruitmentKind,
  pub worker_agreement_type:   AgreementKind,
  #[serde(default)]
  pub worker_agreement_other:  Option<String>,
  /// Tasks were clarified during recruitment.
  pub tasks_clarified:         bool,
  /// The worker performs tasks beyond those agreed upon.
  pub additional_tasks:        bool,
  pub refusal_action:          RefusalAction,
  #[serde(default)]
  pub refusal_action_other:    Option<String>,
  pub salary_status:           SalaryStatus,

  // Attitude battery. The statements live in the collection form; only the
  // coded answers are stored.
  pub recruit_1:           Attitude,
  pub recruit_2:           Attitude,
  pub recruit_3:           Attitude,
  pub conditions_1:        Attitude,
  pub conditions_2:        Attitude,
  pub conditions_3:        Attitude,
  pub conditions_4:        Attitude,
  pub conditions_5:        Attitude,
  pub leaving_1:           Attitude,
  pub leaving_2:           Attitude,
  pub consent_recruitment: Attitude,
}

impl SectionData for WorkerInFarm {
  const KEY: &'static str = "worker_in_farm";

  fn validate(&self, prefix: &str, report: &mut ValidationReport) {
    if self.worker_agreement_type == AgreementKind::Other {
      require_answer(
        report,
        scoped(prefix, "worker_agreement_other"),
        self.worker_agreement_other.as_deref(),
        "when the agreement type is Other",
      );
    }
    if self.refusal_action == RefusalAction::Other {
      require_answer(
        report,
        scoped(prefix, "refusal_action_other"),
        self.refusal_action_other.as_deref(),
        "when the refusal action is Other",
      );
    }
  }
}
