//! Handlers for `/api/claims` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`   | `/api/claims` | `?status=&policyId=&page=&limit=` |
//! | `POST`  | `/api/claims` | Body: [`ClaimDraft`]; 201 |
//! | `GET`   | `/api/claims/{id}` | 404 if absent, 403 if not visible |
//! | `PATCH` | `/api/claims/{id}` | Body: [`ClaimPatch`] |

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
  claim::{Claim, ClaimDraft, ClaimFilter, ClaimPatch, ClaimStatus},
  page::{Page, PageRequest},
  store::InsuranceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extract::CurrentIdentity};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub status:    Option<ClaimStatus>,
  pub policy_id: Option<Uuid>,
  pub page:      Option<u32>,
  pub limit:     Option<u32>,
}

/// `GET /api/claims`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<Claim>>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Query(params) = params?;
  let page = PageRequest::new(params.page, params.limit)?;
  let filter = ClaimFilter { status: params.status, policy_id: params.policy_id };
  Ok(Json(state.claims.list(&identity, filter, page).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /api/claims`; the caller becomes the owner.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  body: Result<Json<ClaimDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Json(draft) = body?;
  let claim = state.claims.create(&identity, draft).await?;
  Ok((StatusCode::CREATED, Json(claim)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /api/claims/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Claim>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  Ok(Json(state.claims.get(&identity, id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /api/claims/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentIdentity(identity): CurrentIdentity,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<ClaimPatch>, JsonRejection>,
) -> Result<Json<Claim>, ApiError>
where
  S: InsuranceStore + 'static,
{
  let Path(id) = id?;
  let Json(patch) = body?;
  Ok(Json(state.claims.update(&identity, id, patch).await?))
}
