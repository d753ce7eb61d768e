//! Field validation — the aggregated per-field error report and the shared
//! character-class rules enforced on free-text answers.
//!
//! Validation never short-circuits: every rule that fails contributes one
//! message, keyed by the field's path (`"farmer_first_name"`,
//! `"consent_location.community_name"`), and the caller rejects the whole
//! request if the report is non-empty.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

// ─── Character-class rules ───────────────────────────────────────────────────

/// Letters only, no spaces (country, region, district).
pub static LETTERS_ONLY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

/// Letters and spaces (person names).
pub static LETTERS_SPACES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

/// Letters and apostrophes, no spaces (owner names).
pub static LETTERS_APOSTROPHES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z']+$").unwrap());

/// Letters, digits, spaces and apostrophes; accents rejected (full names).
pub static NAME_CHARS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9A-Za-z\s']+$").unwrap());

/// Capital letters and digits only (community names as captured on paper).
pub static CAPITALS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Z0-9]+$").unwrap());

/// Capital letters, digits and spaces (free-text "other" answers).
pub static CAPITALS_SPACES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Z0-9\s]+$").unwrap());

// ─── Report ──────────────────────────────────────────────────────────────────

/// Accumulated validation failures, keyed by field path.
///
/// Serialises as a JSON object mapping each offending field to the list of
/// messages recorded against it; the map is ordered so responses are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
  errors: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
  pub fn new() -> Self { Self::default() }

  /// Record one failure message against `field`.
  pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.errors.entry(field.into()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.errors.is_empty() }

  /// Number of offending fields (not messages).
  pub fn len(&self) -> usize { self.errors.len() }

  /// Messages recorded against `field`, if any. Used by tests and callers
  /// that want to inspect a specific failure.
  pub fn field(&self, field: &str) -> Option<&[String]> {
    self.errors.get(field).map(Vec::as_slice)
  }
}

impl std::fmt::Display for ValidationReport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} field(s) failed validation", self.errors.len())
  }
}

/// Join a section prefix and a field name into a report path.
pub fn scoped(prefix: &str, field: &str) -> String {
  if prefix.is_empty() {
    field.to_string()
  } else {
    format!("{prefix}.{field}")
  }
}

// ─── Rule helpers ────────────────────────────────────────────────────────────

/// Require a non-empty value.
pub fn require_nonempty(
  report: &mut ValidationReport,
  field: String,
  value: &str,
) {
  if value.trim().is_empty() {
    report.push(field, "this field may not be blank");
  }
}

/// Require a non-empty value that matches `rule`.
pub fn require_match(
  report: &mut ValidationReport,
  field: String,
  value: &str,
  rule: &Regex,
  message: &str,
) {
  if value.trim().is_empty() {
    report.push(field, "this field may not be blank");
  } else if !rule.is_match(value) {
    report.push(field, message);
  }
}

/// Apply `rule` only when the value is present and non-empty.
pub fn match_if_present(
  report: &mut ValidationReport,
  field: String,
  value: Option<&str>,
  rule: &Regex,
  message: &str,
) {
  if let Some(v) = value
    && !v.is_empty()
    && !rule.is_match(v)
  {
    report.push(field, message);
  }
}

/// Require an integer in the inclusive range `[min, max]`.
pub fn require_between(
  report: &mut ValidationReport,
  field: String,
  value: i64,
  min: i64,
  max: i64,
) {
  if value < min || value > max {
    report.push(field, format!("must be between {min} and {max}"));
  }
}

/// Require a conditionally mandatory answer to be present and non-blank.
pub fn require_answer(
  report: &mut ValidationReport,
  field: String,
  value: Option<&str>,
  reason: &str,
) {
  match value {
    Some(v) if !v.trim().is_empty() => {}
    _ => report.push(field, format!("this field is required {reason}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn report_aggregates_and_orders_fields() {
    let mut report = ValidationReport::new();
    report.push("b_field", "second");
    report.push("a_field", "first");
    report.push("a_field", "again");

    assert!(!report.is_empty());
    assert_eq!(report.len(), 2);
    assert_eq!(report.field("a_field").unwrap().len(), 2);

    let json = serde_json::to_value(&report).unwrap();
    let keys: Vec<&String> =
      json.as_object().unwrap().keys().collect::<Vec<_>>();
    assert_eq!(keys, ["a_field", "b_field"]);
  }

  #[test]
  fn letters_only_rejects_spaces_and_digits() {
    assert!(LETTERS_ONLY.is_match("Ghana"));
    assert!(!LETTERS_ONLY.is_match("Gha na"));
    assert!(!LETTERS_ONLY.is_match("Ghana1"));
  }

  #[test]
  fn name_chars_rejects_accents() {
    assert!(NAME_CHARS.is_match("Kwame Mensah"));
    assert!(NAME_CHARS.is_match("N'Guessan 2"));
    assert!(!NAME_CHARS.is_match("Kofí"));
  }

  #[test]
  fn capitals_rule() {
    assert!(CAPITALS.is_match("NKAWKAW2"));
    assert!(!CAPITALS.is_match("Nkawkaw"));
  }

  #[test]
  fn require_between_bounds() {
    let mut report = ValidationReport::new();
    require_between(&mut report, "hours".into(), 1015, 0, 1015);
    assert!(report.is_empty());
    require_between(&mut report, "hours".into(), 1016, 0, 1015);
    assert_eq!(report.field("hours").unwrap().len(), 1);
  }

  #[test]
  fn scoped_paths() {
    assert_eq!(scoped("", "gps_point"), "gps_point");
    assert_eq!(
      scoped("consent_location", "gps_point"),
      "consent_location.gps_point"
    );
  }
}
