//! Handlers for `/api/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/register` | Body: `{"email","password","name"}`; 201 |
//! | `POST` | `/api/auth/login` | Body: `{"email","password"}`; returns a token |
//! | `GET`  | `/api/auth/me` | The caller's profile |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use claimdesk_auth::accounts::{LoginRequest, Registration};
use claimdesk_core::{store::InsuranceStore, user::User};
use serde_json::json;

use crate::{AppState, error::ApiError, extract::CurrentIdentity};

/// `POST /api/auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Registration>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Json(body) = body?;
  let user = state.accounts.register(body).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "User created successfully", "id": user.id })),
  ))
}

/// `POST /api/auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Json(body) = body?;
  let session = state.accounts.login(body).await?;
  Ok(Json(json!({ "message": "Login successful", "token": session.token })))
}

/// `GET /api/auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<User>, ApiError>
where
  S: InsuranceStore + 'static,
{
  Ok(Json(state.users.me(&identity).await?))
}
