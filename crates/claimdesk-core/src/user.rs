//! Accounts: the public [`User`] view and the private [`Credential`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, access::Owned, identity::Role};

/// An account as shown to callers. Carries no secret material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:         Uuid,
  pub email:      String,
  pub name:       String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A user is the owner of their own record.
impl Owned for User {
  fn owner_id(&self) -> Uuid { self.id }
}

/// The stored login secret for an account. Deliberately not `Serialize`.
#[derive(Debug, Clone)]
pub struct Credential {
  pub subject_id:    Uuid,
  pub email:         String,
  /// argon2 PHC string.
  pub password_hash: String,
}

/// Input to [`crate::store::InsuranceStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub name:          String,
  pub password_hash: String,
}

/// Partial update of a user's profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub name:  Option<String>,
  pub email: Option<String>,
}

impl UserPatch {
  pub fn is_empty(&self) -> bool { self.name.is_none() && self.email.is_none() }

  /// Trim, lower-case the email, and check each provided field.
  pub fn normalize(mut self) -> Result<Self> {
    if self.is_empty() {
      return Err(Error::validation("No fields to update"));
    }
    if let Some(name) = self.name.take() {
      let name = name.trim().to_string();
      if name.is_empty() {
        return Err(Error::validation("Name must not be empty"));
      }
      self.name = Some(name);
    }
    if let Some(email) = self.email.take() {
      self.email = Some(normalize_email(&email)?);
    }
    Ok(self)
  }
}

/// Trim and lower-case an address, rejecting anything that is not shaped like
/// `local@domain.tld`.
pub fn normalize_email(raw: &str) -> Result<String> {
  let email = raw.trim().to_lowercase();
  let valid = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  };
  if valid {
    Ok(email)
  } else {
    Err(Error::validation("Invalid email address"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_are_normalised() {
    assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
  }

  #[test]
  fn malformed_emails_are_rejected() {
    for bad in ["", "alice", "alice@", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com"] {
      assert!(normalize_email(bad).is_err(), "{bad:?} accepted");
    }
  }

  #[test]
  fn empty_patch_is_rejected() {
    assert!(matches!(UserPatch::default().normalize(), Err(Error::Validation(_))));
  }

  #[test]
  fn blank_name_is_rejected() {
    let patch = UserPatch { name: Some("   ".into()), email: None };
    assert!(patch.normalize().is_err());
  }
}
