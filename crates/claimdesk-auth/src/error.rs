//! Error types for `claimdesk-auth`.

use claimdesk_core::Error as CoreError;
use thiserror::Error;

/// Why a bearer token was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
  #[error("access token required")]
  Missing,

  #[error("token expired")]
  Expired,

  /// Bad encoding, bad signature, or missing claims.
  #[error("invalid token")]
  Malformed,

  /// The signing secret was empty when the service was built.
  #[error("token signing secret is not configured")]
  NoSecret,

  #[error("token signing failed: {0}")]
  Signing(String),
}

impl From<TokenError> for CoreError {
  fn from(e: TokenError) -> Self {
    match e {
      TokenError::Missing => CoreError::Unauthenticated("Access token required".into()),
      TokenError::Expired => CoreError::Unauthenticated("Token expired".into()),
      TokenError::Malformed => CoreError::Unauthenticated("Invalid token".into()),
      TokenError::NoSecret | TokenError::Signing(_) => {
        tracing::error!(error = %e, "token service failure");
        CoreError::Internal
      }
    }
  }
}
