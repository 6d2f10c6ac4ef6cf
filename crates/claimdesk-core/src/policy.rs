//! Insurance policies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, access::Owned, date};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The kind of property a policy covers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyType {
  House,
  Apartment,
  Condo,
  Commercial,
}

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
pub enum PolicyStatus {
  #[default]
  Active,
  Pending,
  Expired,
  Cancelled,
}

// ─── Policy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
  pub id:              Uuid,
  /// `POL-{owner_id}-{n}`; human-readable, not guaranteed unique.
  pub policy_number:   String,
  pub owner_id:        Uuid,
  pub property_id:     Uuid,
  #[serde(rename = "type")]
  pub policy_type:     PolicyType,
  pub status:          PolicyStatus,
  pub premium:         f64,
  pub coverage_amount: f64,
  pub deductible:      f64,
  pub start_date:      DateTime<Utc>,
  pub end_date:        DateTime<Utc>,
  pub created_at:      DateTime<Utc>,
}

impl Owned for Policy {
  fn owner_id(&self) -> Uuid { self.owner_id }
}

/// Format the human-readable number for an owner's `nth` policy.
pub fn policy_number(owner_id: Uuid, nth: u64) -> String { format!("POL-{owner_id}-{nth}") }

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Payload for creating a policy; every field is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDraft {
  #[serde(rename = "type")]
  pub policy_type:     PolicyType,
  pub property_id:     Uuid,
  #[serde(deserialize_with = "date::deserialize")]
  pub start_date:      DateTime<Utc>,
  #[serde(deserialize_with = "date::deserialize")]
  pub end_date:        DateTime<Utc>,
  pub premium:         f64,
  pub coverage_amount: f64,
  pub deductible:      f64,
}

impl PolicyDraft {
  pub fn validate(&self) -> Result<()> {
    positive("premium", self.premium)?;
    positive("coverageAmount", self.coverage_amount)?;
    positive("deductible", self.deductible)?;
    date_order(self.start_date, self.end_date)
  }
}

/// Partial update of a policy. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPatch {
  #[serde(default, rename = "type")]
  pub policy_type:     Option<PolicyType>,
  #[serde(default, deserialize_with = "date::deserialize_option")]
  pub start_date:      Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "date::deserialize_option")]
  pub end_date:        Option<DateTime<Utc>>,
  pub premium:         Option<f64>,
  pub coverage_amount: Option<f64>,
  pub deductible:      Option<f64>,
  pub status:          Option<PolicyStatus>,
}

impl PolicyPatch {
  pub fn is_empty(&self) -> bool {
    self.policy_type.is_none()
      && self.start_date.is_none()
      && self.end_date.is_none()
      && self.premium.is_none()
      && self.coverage_amount.is_none()
      && self.deductible.is_none()
      && self.status.is_none()
  }

  /// Check the patch against the record it will be applied to.
  pub fn validate_against(&self, current: &Policy) -> Result<()> {
    if self.is_empty() {
      return Err(Error::validation("No fields to update"));
    }
    if let Some(v) = self.premium {
      positive("premium", v)?;
    }
    if let Some(v) = self.coverage_amount {
      positive("coverageAmount", v)?;
    }
    if let Some(v) = self.deductible {
      positive("deductible", v)?;
    }
    date_order(
      self.start_date.unwrap_or(current.start_date),
      self.end_date.unwrap_or(current.end_date),
    )
  }
}

/// Caller-supplied list filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyFilter {
  pub status:      Option<PolicyStatus>,
  pub policy_type: Option<PolicyType>,
}

// ─── Validation helpers ──────────────────────────────────────────────────────

pub(crate) fn positive(field: &str, value: f64) -> Result<()> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(Error::validation(format!("{field} must be a positive number")))
  }
}

fn date_order(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
  if end > start {
    Ok(())
  } else {
    Err(Error::validation("endDate must be after startDate"))
  }
}
