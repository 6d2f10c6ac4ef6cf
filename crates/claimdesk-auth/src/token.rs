//! HS256 identity tokens.
//!
//! A token carries `{sub, email, iat, exp}` and nothing about roles. It is
//! verified with the shared secret alone, so no storage round trip is needed;
//! expiry is enforced at verification time with zero leeway.

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TokenError;

/// How long an issued token stays valid, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Wire form of the token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
  sub:   Uuid,
  email: String,
  iat:   i64,
  exp:   i64,
}

/// The decoded contents of a token that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
  pub subject_id: Uuid,
  pub email:      String,
  pub issued_at:  DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

/// Issues and verifies tokens with a process-wide secret.
///
/// Built once at startup; never mutated afterwards.
pub struct TokenService {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl std::fmt::Debug for TokenService {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenService").finish_non_exhaustive()
  }
}

impl TokenService {
  pub fn new(secret: &str) -> Result<Self, TokenError> {
    if secret.trim().is_empty() {
      return Err(TokenError::NoSecret);
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Ok(Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
    })
  }

  /// Sign a token for `subject_id`, valid for [`TOKEN_TTL_SECS`] from now.
  pub fn issue(&self, subject_id: Uuid, email: &str) -> Result<String, TokenError> {
    self.issue_at(subject_id, email, Utc::now())
  }

  /// Sign a token as if issued at `issued_at`.
  pub fn issue_at(
    &self,
    subject_id: Uuid,
    email: &str,
    issued_at: DateTime<Utc>,
  ) -> Result<String, TokenError> {
    let claims = TokenClaims {
      sub:   subject_id,
      email: email.to_string(),
      iat:   issued_at.timestamp(),
      exp:   (issued_at + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| TokenError::Signing(e.to_string()))
  }

  /// Verify a raw token, if one was supplied.
  pub fn verify(&self, token: Option<&str>) -> Result<VerifiedToken, TokenError> {
    let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(TokenError::Missing)?;

    let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
      match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
      }
    })?;

    let claims = data.claims;
    let issued_at = timestamp(claims.iat)?;
    let expires_at = timestamp(claims.exp)?;

    Ok(VerifiedToken {
      subject_id: claims.sub,
      email: claims.email,
      issued_at,
      expires_at,
    })
  }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
  Utc.timestamp_opt(secs, 0).single().ok_or(TokenError::Malformed)
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
  let value = header?.trim();
  let (scheme, token) = value.split_once(' ')?;
  scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}
