use std::sync::Arc;

use uuid::Uuid;

use super::storage_error;
use crate::{
  Error, Result,
  access::{self, Action, ResourceKind},
  date,
  identity::Identity,
  page::{Page, PageRequest},
  policy::{Policy, PolicyDraft, PolicyFilter, PolicyPatch, policy_number},
  store::{InsuranceStore, PolicyQuery},
};

const KIND: ResourceKind = ResourceKind::Policies;

/// Policy operations, scoped by the caller's identity.
pub struct PolicyService<S> {
  store: Arc<S>,
}

impl<S> Clone for PolicyService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: InsuranceStore> PolicyService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn list(
    &self,
    identity: &Identity,
    filter: PolicyFilter,
    page: PageRequest,
  ) -> Result<Page<Policy>> {
    let scope = access::scope(identity, KIND, Action::List);
    let query = PolicyQuery {
      owner_id: scope.owner_filter(),
      status: filter.status,
      policy_type: filter.policy_type,
      page,
    };
    let (rows, total) = self.store.list_policies(query).await.map_err(storage_error)?;
    Ok(Page::new(rows, total, page))
  }

  pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<Policy> {
    self.fetch_authorized(identity, id, Action::Read).await
  }

  pub async fn create(&self, identity: &Identity, draft: PolicyDraft) -> Result<Policy> {
    draft.validate()?;

    let owned = self
      .store
      .count_policies_for_owner(identity.subject_id)
      .await
      .map_err(storage_error)?;

    let policy = Policy {
      id:              Uuid::new_v4(),
      policy_number:   policy_number(identity.subject_id, owned + 1),
      owner_id:        identity.subject_id,
      property_id:     draft.property_id,
      policy_type:     draft.policy_type,
      status:          Default::default(),
      premium:         draft.premium,
      coverage_amount: draft.coverage_amount,
      deductible:      draft.deductible,
      start_date:      draft.start_date,
      end_date:        draft.end_date,
      created_at:      date::now(),
    };
    self.store.insert_policy(&policy).await.map_err(storage_error)?;

    tracing::info!(
      policy = %policy.id,
      number = %policy.policy_number,
      owner = %policy.owner_id,
      "policy created"
    );
    Ok(policy)
  }

  pub async fn update(
    &self,
    identity: &Identity,
    id: Uuid,
    patch: PolicyPatch,
  ) -> Result<Policy> {
    let current = self.fetch_authorized(identity, id, Action::Update).await?;
    patch.validate_against(&current)?;

    let updated = self
      .store
      .update_policy(id, &patch)
      .await
      .map_err(storage_error)?
      .ok_or_else(not_found)?;

    tracing::info!(policy = %id, by = %identity.subject_id, "policy updated");
    Ok(updated)
  }

  /// Fetch by id without scoping, then apply the record-level check.
  async fn fetch_authorized(
    &self,
    identity: &Identity,
    id: Uuid,
    action: Action,
  ) -> Result<Policy> {
    let policy = self
      .store
      .get_policy(id)
      .await
      .map_err(storage_error)?
      .ok_or_else(not_found)?;
    access::authorize_record(identity, &policy, KIND, action).into_result(KIND, action)?;
    Ok(policy)
  }
}

fn not_found() -> Error { Error::NotFound("Policy not found".to_string()) }
