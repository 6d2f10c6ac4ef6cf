use std::sync::Arc;

use uuid::Uuid;

use super::storage_error;
use crate::{
  Error, Result,
  access::{self, Action, ResourceKind},
  claim::{Claim, ClaimDraft, ClaimFilter, ClaimPatch, ClaimStatus, claim_number},
  date,
  identity::Identity,
  page::{Page, PageRequest},
  store::{ClaimQuery, InsuranceStore},
};

const KIND: ResourceKind = ResourceKind::Claims;

/// Claim operations, scoped by the caller's identity.
pub struct ClaimService<S> {
  store: Arc<S>,
}

impl<S> Clone for ClaimService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: InsuranceStore> ClaimService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn list(
    &self,
    identity: &Identity,
    filter: ClaimFilter,
    page: PageRequest,
  ) -> Result<Page<Claim>> {
    let scope = access::scope(identity, KIND, Action::List);
    let query = ClaimQuery {
      owner_id: scope.owner_filter(),
      status: filter.status,
      policy_id: filter.policy_id,
      page,
    };
    let (rows, total) = self.store.list_claims(query).await.map_err(storage_error)?;
    Ok(Page::new(rows, total, page))
  }

  pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<Claim> {
    self.fetch_authorized(identity, id, Action::Read).await
  }

  /// File a claim against a policy the caller can see.
  pub async fn create(&self, identity: &Identity, draft: ClaimDraft) -> Result<Claim> {
    draft.validate()?;

    let policy = self
      .store
      .get_policy(draft.policy_id)
      .await
      .map_err(storage_error)?
      .ok_or_else(|| Error::validation("Referenced policy does not exist"))?;
    access::authorize_record(identity, &policy, ResourceKind::Policies, Action::Read)
      .into_result(ResourceKind::Policies, Action::Read)?;

    let filed = self
      .store
      .count_claims_for_policy(policy.id)
      .await
      .map_err(storage_error)?;

    let claim = Claim {
      id:            Uuid::new_v4(),
      claim_number:  claim_number(policy.id, filed + 1),
      policy_id:     policy.id,
      property_id:   draft.property_id,
      owner_id:      identity.subject_id,
      adjuster_id:   None,
      description:   draft.description.trim().to_string(),
      amount:        draft.amount,
      incident_date: draft.incident_date,
      status:        Default::default(),
      created_at:    date::now(),
    };
    self.store.insert_claim(&claim).await.map_err(storage_error)?;

    tracing::info!(
      claim = %claim.id,
      number = %claim.claim_number,
      policy = %claim.policy_id,
      owner = %claim.owner_id,
      "claim filed"
    );
    Ok(claim)
  }

  /// Apply a partial update. Owners may edit only while the claim is a
  /// draft; status and adjuster changes need a privileged role.
  pub async fn update(
    &self,
    identity: &Identity,
    id: Uuid,
    mut patch: ClaimPatch,
  ) -> Result<Claim> {
    let current = self.fetch_authorized(identity, id, Action::Update).await?;
    patch.validate()?;

    let privileged = KIND.is_privileged(identity.role);
    if patch.touches_workflow() {
      access::require_privileged(identity, KIND, Action::Update)
        .into_result(KIND, Action::Update)?;
    }
    if !privileged && current.status != ClaimStatus::Draft {
      tracing::debug!(claim = %id, status = %current.status, "owner edit after submission");
      return Err(Error::Conflict("Only draft claims can be edited by their owner".to_string()));
    }
    if let Some(Some(adjuster)) = patch.adjuster_id {
      self.check_adjuster(adjuster).await?;
    }
    patch.description = patch.description.map(|d| d.trim().to_string());

    let updated = self
      .store
      .update_claim(id, &patch)
      .await
      .map_err(storage_error)?
      .ok_or_else(not_found)?;

    tracing::info!(claim = %id, by = %identity.subject_id, "claim updated");
    Ok(updated)
  }

  /// An assignee must exist and hold a role that can work claims.
  async fn check_adjuster(&self, adjuster: Uuid) -> Result<()> {
    let user = self
      .store
      .get_user(adjuster)
      .await
      .map_err(storage_error)?
      .ok_or_else(|| Error::validation("Referenced adjuster does not exist"))?;
    if !KIND.is_privileged(user.role) {
      return Err(Error::validation("Assigned user cannot adjust claims"));
    }
    Ok(())
  }

  /// Fetch by id without scoping, then apply the record-level check.
  async fn fetch_authorized(
    &self,
    identity: &Identity,
    id: Uuid,
    action: Action,
  ) -> Result<Claim> {
    let claim = self
      .store
      .get_claim(id)
      .await
      .map_err(storage_error)?
      .ok_or_else(not_found)?;
    access::authorize_record(identity, &claim, KIND, action).into_result(KIND, action)?;
    Ok(claim)
  }
}

fn not_found() -> Error { Error::NotFound("Claim not found".to_string()) }
