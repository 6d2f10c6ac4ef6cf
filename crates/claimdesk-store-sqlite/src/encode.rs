//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! in UTC, so lexical order matches chronological order. Enumerations are
//! stored under their wire names (`ACTIVE`, `UNDER_REVIEW`, ...). UUIDs are
//! stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use claimdesk_core::{
  claim::{Claim, ClaimStatus},
  identity::Role,
  policy::{Policy, PolicyStatus, PolicyType},
  user::{Credential, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Parse a stored enumeration name; `what` names the column for the error.
pub fn decode_enum<T: FromStr>(s: &str, what: &str) -> Result<T> {
  s.parse().map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "user_id, email, name, role, created_at, updated_at, password_hash";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub name:          String,
  pub role:          String,
  pub created_at:    String,
  pub updated_at:    String,
  pub password_hash: String,
}

impl RawUser {
  /// Read a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      email:         row.get(1)?,
      name:          row.get(2)?,
      role:          row.get(3)?,
      created_at:    row.get(4)?,
      updated_at:    row.get(5)?,
      password_hash: row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         decode_uuid(&self.user_id)?,
      email:      self.email,
      name:       self.name,
      role:       decode_enum::<Role>(&self.role, "role")?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }

  pub fn into_credential(self) -> Result<Credential> {
    Ok(Credential {
      subject_id:    decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
    })
  }
}

pub const POLICY_COLUMNS: &str = "policy_id, policy_number, owner_id, property_id, \
  policy_type, status, premium, coverage_amount, deductible, start_date, end_date, created_at";

/// Raw values read directly from a `policies` row.
pub struct RawPolicy {
  pub policy_id:       String,
  pub policy_number:   String,
  pub owner_id:        String,
  pub property_id:     String,
  pub policy_type:     String,
  pub status:          String,
  pub premium:         f64,
  pub coverage_amount: f64,
  pub deductible:      f64,
  pub start_date:      String,
  pub end_date:        String,
  pub created_at:      String,
}

impl RawPolicy {
  /// Read a row selected with [`POLICY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      policy_id:       row.get(0)?,
      policy_number:   row.get(1)?,
      owner_id:        row.get(2)?,
      property_id:     row.get(3)?,
      policy_type:     row.get(4)?,
      status:          row.get(5)?,
      premium:         row.get(6)?,
      coverage_amount: row.get(7)?,
      deductible:      row.get(8)?,
      start_date:      row.get(9)?,
      end_date:        row.get(10)?,
      created_at:      row.get(11)?,
    })
  }

  pub fn into_policy(self) -> Result<Policy> {
    Ok(Policy {
      id:              decode_uuid(&self.policy_id)?,
      policy_number:   self.policy_number,
      owner_id:        decode_uuid(&self.owner_id)?,
      property_id:     decode_uuid(&self.property_id)?,
      policy_type:     decode_enum::<PolicyType>(&self.policy_type, "policy type")?,
      status:          decode_enum::<PolicyStatus>(&self.status, "policy status")?,
      premium:         self.premium,
      coverage_amount: self.coverage_amount,
      deductible:      self.deductible,
      start_date:      decode_dt(&self.start_date)?,
      end_date:        decode_dt(&self.end_date)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub const CLAIM_COLUMNS: &str = "claim_id, claim_number, policy_id, property_id, owner_id, \
  adjuster_id, description, amount, incident_date, status, created_at";

/// Raw values read directly from a `claims` row.
pub struct RawClaim {
  pub claim_id:      String,
  pub claim_number:  String,
  pub policy_id:     String,
  pub property_id:   String,
  pub owner_id:      String,
  pub adjuster_id:   Option<String>,
  pub description:   String,
  pub amount:        f64,
  pub incident_date: String,
  pub status:        String,
  pub created_at:    String,
}

impl RawClaim {
  /// Read a row selected with [`CLAIM_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      claim_id:      row.get(0)?,
      claim_number:  row.get(1)?,
      policy_id:     row.get(2)?,
      property_id:   row.get(3)?,
      owner_id:      row.get(4)?,
      adjuster_id:   row.get(5)?,
      description:   row.get(6)?,
      amount:        row.get(7)?,
      incident_date: row.get(8)?,
      status:        row.get(9)?,
      created_at:    row.get(10)?,
    })
  }

  pub fn into_claim(self) -> Result<Claim> {
    Ok(Claim {
      id:            decode_uuid(&self.claim_id)?,
      claim_number:  self.claim_number,
      policy_id:     decode_uuid(&self.policy_id)?,
      property_id:   decode_uuid(&self.property_id)?,
      owner_id:      decode_uuid(&self.owner_id)?,
      adjuster_id:   self.adjuster_id.as_deref().map(decode_uuid).transpose()?,
      description:   self.description,
      amount:        self.amount,
      incident_date: decode_dt(&self.incident_date)?,
      status:        decode_enum::<ClaimStatus>(&self.status, "claim status")?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
