//! Handlers for `/api/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/users` | Admins see everyone, others only themselves |
//! | `GET`    | `/api/users/{id}` | Self or admin |
//! | `PATCH`  | `/api/users/{id}` | Body: `{"name"?, "email"?}` |
//! | `DELETE` | `/api/users/{id}` | 204; refused while the user owns records |
//! | `PUT`    | `/api/users/{id}/role` | Body: `{"role":"ADJUSTER"}`; admin only |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
};
use claimdesk_core::{
  identity::Role,
  page::{Page, PageRequest},
  store::InsuranceStore,
  user::{User, UserPatch},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::CurrentIdentity};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub page:  Option<u32>,
  pub limit: Option<u32>,
}

/// `GET /api/users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<User>>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Query(params) = params?;
  let page = PageRequest::new(params.page, params.limit)?;
  Ok(Json(state.users.list(&identity, page).await?))
}

/// `GET /api/users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<User>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  Ok(Json(state.users.get(&identity, id).await?))
}

/// `PATCH /api/users/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  let Json(patch) = body?;
  Ok(Json(state.users.update(&identity, id, patch).await?))
}

/// `DELETE /api/users/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  state.users.delete(&identity, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /api/users/{id}/role`
pub async fn set_role<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<RoleBody>, JsonRejection>,
) -> Result<Json<User>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  let Json(body) = body?;
  Ok(Json(state.users.set_role(&identity, id, body.role).await?))
}
