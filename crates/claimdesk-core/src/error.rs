//! Error types for `claimdesk-core`.
//!
//! Every failure a resource operation can report falls into one of the
//! [`ErrorKind`]s. Messages carried by the variants are safe to show to the
//! caller; internal detail is logged where it is caught and never stored here.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal server error")]
  Internal,
}

/// Stable, machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
  ValidationFailed,
  Unauthenticated,
  Forbidden,
  NotFound,
  Conflict,
  Internal,
}

impl ErrorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ValidationFailed => "VALIDATION_FAILED",
      Self::Unauthenticated => "UNAUTHENTICATED",
      Self::Forbidden => "FORBIDDEN",
      Self::NotFound => "NOT_FOUND",
      Self::Conflict => "CONFLICT",
      Self::Internal => "INTERNAL",
    }
  }
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::ValidationFailed,
      Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Internal => ErrorKind::Internal,
    }
  }

  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
