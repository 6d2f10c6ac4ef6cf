//! Caller identity: who is making the current request, and in what role.
//!
//! A verified token only proves *who* the caller is. The role is looked up
//! fresh for every request through [`resolve`], so a demotion takes effect on
//! the next request rather than when the token expires.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  service::storage_error,
  store::InsuranceStore,
};

/// The closed set of account roles.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
  Admin,
  Adjuster,
  Agent,
  /// A customer; the role every new account starts with.
  #[default]
  User,
}

/// The authenticated caller for the lifetime of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
  pub subject_id: Uuid,
  pub role:       Role,
}

impl Identity {
  pub fn new(subject_id: Uuid, role: Role) -> Self { Self { subject_id, role } }
}

/// Bind a verified subject to its current role.
///
/// Returns [`Error::NotFound`] when the subject no longer exists.
pub async fn resolve<S>(store: &S, subject_id: Uuid) -> Result<Identity>
where
  S: InsuranceStore,
{
  let user = store
    .get_user(subject_id)
    .await
    .map_err(storage_error)?
    .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

  Ok(Identity::new(user.id, user.role))
}
