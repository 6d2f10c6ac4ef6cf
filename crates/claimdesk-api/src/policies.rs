//! Handlers for `/api/policies` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/policies` | `?status=&type=&page=&limit=` |
//! | `POST` | `/api/policies` | Body: [`PolicyDraft`]; 201 |
//! | `GET`  | `/api/policies/{id}` | 404 if absent, 403 if not visible |
//! | `PUT`, `PATCH` | `/api/policies/{id}` | Body: [`PolicyPatch`] |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use claimdesk_core::{
  page::{Page, PageRequest},
  policy::{Policy, PolicyDraft, PolicyFilter, PolicyPatch, PolicyStatus, PolicyType},
  store::InsuranceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::CurrentIdentity};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status:      Option<PolicyStatus>,
  #[serde(rename = "type")]
  pub policy_type: Option<PolicyType>,
  pub page:        Option<u32>,
  pub limit:       Option<u32>,
}

/// `GET /api/policies`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<Policy>>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Query(params) = params?;
  let page = PageRequest::new(params.page, params.limit)?;
  let filter = PolicyFilter { status: params.status, policy_type: params.policy_type };
  Ok(Json(state.policies.list(&identity, filter, page).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /api/policies`; the caller becomes the owner.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  body: Result<Json<PolicyDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Json(draft) = body?;
  let policy = state.policies.create(&identity, draft).await?;
  Ok((StatusCode::CREATED, Json(policy)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /api/policies/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Policy>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  Ok(Json(state.policies.get(&identity, id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT|PATCH /api/policies/{id}`; only the provided fields change.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<PolicyPatch>, JsonRejection>,
) -> Result<Json<Policy>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  let Json(patch) = body?;
  Ok(Json(state.policies.update(&identity, id, patch).await?))
}
