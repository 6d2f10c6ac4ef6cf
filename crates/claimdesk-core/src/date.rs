//! Lenient parsing for date-like request fields.
//!
//! Clients send either a full RFC 3339 timestamp or a bare calendar date
//! (`2024-05-01`). Both are normalised to a UTC instant; a bare date means
//! midnight UTC.
//!
//! Every instant is kept at microsecond precision, the resolution storage
//! preserves, so a record reads back exactly as it was created.

use chrono::{DateTime, NaiveDate, SubsecRound as _, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

/// Number of sub-second digits kept on every instant.
pub const SUBSEC_DIGITS: u16 = 6;

/// The current instant, truncated to microseconds.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(SUBSEC_DIGITS) }

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc).trunc_subsecs(SUBSEC_DIGITS));
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|ndt| ndt.and_utc())
}

/// `deserialize_with` helper for required date fields.
pub fn deserialize<'de, D>(de: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(de)?;
  parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw:?}")))
}

/// `deserialize_with` helper for optional date fields; pair with
/// `#[serde(default)]`.
pub fn deserialize_option<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(de)? {
    None => Ok(None),
    Some(raw) => parse(&raw)
      .map(Some)
      .ok_or_else(|| D::Error::custom(format!("invalid date: {raw:?}"))),
  }
}
