//! Insurance claims. Every claim belongs to exactly one policy; its owner is
//! whoever filed it, and an adjuster may be assigned later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, access::Owned, date, policy::positive};

/// Minimum length of a claim description, in characters.
pub const MIN_DESCRIPTION_LEN: usize = 10;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
  #[default]
  Draft,
  Submitted,
  UnderReview,
  Approved,
  Rejected,
  Paid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
  pub id:            Uuid,
  /// `CLM-{policy_id}-{n}`; human-readable, not guaranteed unique.
  pub claim_number:  String,
  pub policy_id:     Uuid,
  pub property_id:   Uuid,
  pub owner_id:      Uuid,
  pub adjuster_id:   Option<Uuid>,
  pub description:   String,
  pub amount:        f64,
  pub incident_date: DateTime<Utc>,
  pub status:        ClaimStatus,
  pub created_at:    DateTime<Utc>,
}

impl Owned for Claim {
  fn owner_id(&self) -> Uuid { self.owner_id }
}

/// Format the human-readable number for the `nth` claim against a policy.
pub fn claim_number(policy_id: Uuid, nth: u64) -> String { format!("CLM-{policy_id}-{nth}") }

/// Payload for filing a claim; every field is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDraft {
  pub policy_id:     Uuid,
  pub property_id:   Uuid,
  pub description:   String,
  pub amount:        f64,
  #[serde(deserialize_with = "date::deserialize")]
  pub incident_date: DateTime<Utc>,
}

impl ClaimDraft {
  pub fn validate(&self) -> Result<()> {
    description(&self.description)?;
    positive("amount", self.amount)
  }
}

/// Partial update of a claim. `status` and `adjuster_id` are reserved for
/// privileged roles; the service enforces that.
///
/// `adjuster_id` is tri-state: absent leaves the assignment alone, `null`
/// unassigns, and an id assigns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPatch {
  pub description:   Option<String>,
  pub amount:        Option<f64>,
  #[serde(default, deserialize_with = "date::deserialize_option")]
  pub incident_date: Option<DateTime<Utc>>,
  pub status:        Option<ClaimStatus>,
  #[serde(default, deserialize_with = "present")]
  pub adjuster_id:   Option<Option<Uuid>>,
}

/// Wrap any present value, `null` included, so it is told apart from a
/// missing field.
fn present<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(de).map(Some)
}

impl ClaimPatch {
  pub fn is_empty(&self) -> bool {
    self.description.is_none()
      && self.amount.is_none()
      && self.incident_date.is_none()
      && self.status.is_none()
      && self.adjuster_id.is_none()
  }

  /// Whether the patch touches fields only privileged roles may change.
  pub fn touches_workflow(&self) -> bool {
    self.status.is_some() || self.adjuster_id.is_some()
  }

  pub fn validate(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::validation("No fields to update"));
    }
    if let Some(d) = &self.description {
      description(d)?;
    }
    if let Some(a) = self.amount {
      positive("amount", a)?;
    }
    Ok(())
  }
}

/// Caller-supplied list filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimFilter {
  pub status:    Option<ClaimStatus>,
  pub policy_id: Option<Uuid>,
}

fn description(d: &str) -> Result<()> {
  if d.trim().chars().count() >= MIN_DESCRIPTION_LEN {
    Ok(())
  } else {
    Err(Error::validation(format!(
      "description must be at least {MIN_DESCRIPTION_LEN} characters"
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft() -> ClaimDraft {
    ClaimDraft {
      policy_id:     Uuid::new_v4(),
      property_id:   Uuid::new_v4(),
      description:   "Burst pipe flooded the kitchen".into(),
      amount:        4200.0,
      incident_date: Utc::now(),
    }
  }

  #[test]
  fn valid_draft_passes() {
    assert!(draft().validate().is_ok());
  }

  #[test]
  fn short_description_fails() {
    let mut d = draft();
    d.description = "  leak    ".into();
    assert!(matches!(d.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn negative_amount_fails() {
    let mut d = draft();
    d.amount = -1.0;
    assert!(d.validate().is_err());
  }

  #[test]
  fn workflow_fields_are_flagged() {
    let patch = ClaimPatch { status: Some(ClaimStatus::Approved), ..Default::default() };
    assert!(patch.touches_workflow());
    let patch = ClaimPatch { amount: Some(10.0), ..Default::default() };
    assert!(!patch.touches_workflow());
    assert!(ClaimPatch::default().validate().is_err());
  }

  #[test]
  fn adjuster_field_distinguishes_missing_null_and_id() {
    let patch: ClaimPatch = serde_json::from_str(r#"{"amount": 5.0}"#).unwrap();
    assert_eq!(patch.adjuster_id, None);

    let patch: ClaimPatch = serde_json::from_str(r#"{"adjusterId": null}"#).unwrap();
    assert_eq!(patch.adjuster_id, Some(None));
    assert!(patch.touches_workflow());
    assert!(patch.validate().is_ok());

    let id = Uuid::new_v4();
    let patch: ClaimPatch =
      serde_json::from_str(&format!(r#"{{"adjusterId": "{id}"}}"#)).unwrap();
    assert_eq!(patch.adjuster_id, Some(Some(id)));
  }

  #[test]
  fn status_uses_screaming_snake_case() {
    let s: ClaimStatus = serde_json::from_str(r#""UNDER_REVIEW""#).unwrap();
    assert_eq!(s, ClaimStatus::UnderReview);
    assert_eq!(s.to_string(), "UNDER_REVIEW");
  }
}
