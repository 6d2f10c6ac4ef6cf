//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use claimdesk_core::{Error, ErrorKind};
use serde_json::json;

/// An error returned by an API handler.
///
/// Renders as `{"error": "<KIND>", "message": "<message>"}`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0.kind() {
      ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
      ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
      ErrorKind::Forbidden => StatusCode::FORBIDDEN,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Conflict => StatusCode::CONFLICT,
      ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

// Extractor rejections are the caller's fault: bad JSON, bad query string, or
// an id that is not a UUID.

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError(Error::validation(rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError(Error::validation(rejection.body_text()))
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError(Error::validation(rejection.body_text()))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self.0 {
      Error::Internal => "Internal server error".to_string(),
      other => other.to_string(),
    };
    let body = json!({ "error": self.0.kind().as_str(), "message": message });
    (status, Json(body)).into_response()
  }
}
