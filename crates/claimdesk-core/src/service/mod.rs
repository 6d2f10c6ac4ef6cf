//! Resource services: the CRUD operations callers reach, with the access
//! policy engine applied to each of them.
//!
//! Every service holds the injected store handle. Authorization is decided
//! before any mutation is issued, and storage failures are translated here so
//! nothing backend-specific crosses the service boundary.

mod claims;
mod policies;
mod users;

pub use claims::ClaimService;
pub use policies::PolicyService;
pub use users::UserService;

use crate::{
  Error,
  store::{StoreError, StoreErrorKind},
};

/// Translate a backend error into a caller-safe [`Error`].
///
/// Unexpected failures are logged with their detail and reported as
/// [`Error::Internal`].
pub fn storage_error<E: StoreError>(err: E) -> Error {
  match err.kind() {
    StoreErrorKind::NotFound => Error::NotFound("Resource not found".to_string()),
    StoreErrorKind::Conflict => {
      Error::Conflict("Request conflicts with existing data".to_string())
    }
    StoreErrorKind::MissingReference => {
      Error::validation("Referenced record does not exist")
    }
    StoreErrorKind::Backend => {
      tracing::error!(error = %err, "storage failure");
      Error::Internal
    }
  }
}
