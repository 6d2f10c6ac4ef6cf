//! Error type for `claimdesk-store-sqlite`.

use claimdesk_core::store::{StoreError, StoreErrorKind};
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value the domain types cannot represent.
  #[error("decode error: {0}")]
  Decode(String),

  /// A user could not be deleted because policies or claims still point at
  /// them.
  #[error("user {0} still has dependent records")]
  HasDependents(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// The SQLite extended result code, if this is a constraint violation.
  pub(crate) fn constraint_code(&self) -> Option<i32> {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        failure,
        _,
      ))) if failure.code == rusqlite::ErrorCode::ConstraintViolation => {
        Some(failure.extended_code)
      }
      _ => None,
    }
  }

  pub(crate) fn is_foreign_key_violation(&self) -> bool {
    self.constraint_code() == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
  }
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    if let Error::HasDependents(_) = self {
      return StoreErrorKind::Conflict;
    }
    match self.constraint_code() {
      Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
        StoreErrorKind::Conflict
      }
      Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => StoreErrorKind::MissingReference,
      _ => StoreErrorKind::Backend,
    }
  }
}
