//! Bearer-token extractor that yields the caller's [`Identity`].

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use claimdesk_auth::token::bearer_token;
use claimdesk_core::{
  Error,
  identity::{self, Identity},
  store::InsuranceStore,
};

use crate::{AppState, error::ApiError};

/// The authenticated caller, with the role currently stored for them.
///
/// Built once per request and dropped with it.
#[derive(Debug, Clone, Copy)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<AppState<S>> for CurrentIdentity
where
  S: InsuranceStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok());

    let verified = state.tokens.verify(bearer_token(header)).map_err(Error::from)?;

    let identity = identity::resolve(state.store.as_ref(), verified.subject_id)
      .await
      .map_err(|e| match e {
        Error::NotFound(_) => {
          tracing::info!(user = %verified.subject_id, "token for deleted account");
          Error::Unauthenticated("Invalid token".into())
        }
        other => other,
      })?;

    Ok(CurrentIdentity(identity))
  }
}
