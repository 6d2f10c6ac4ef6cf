use std::sync::Arc;

use uuid::Uuid;

use super::storage_error;
use crate::{
  Error, Result,
  access::{self, Action, ResourceKind},
  identity::{Identity, Role},
  page::{Page, PageRequest},
  store::{InsuranceStore, UserQuery},
  user::{User, UserPatch},
};

const KIND: ResourceKind = ResourceKind::Users;

/// Self-service account operations. Non-admin callers may only act on their
/// own record.
pub struct UserService<S> {
  store: Arc<S>,
}

impl<S> Clone for UserService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: InsuranceStore> UserService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// The caller's own profile.
  pub async fn me(&self, identity: &Identity) -> Result<User> {
    self.get(identity, identity.subject_id).await
  }

  pub async fn list(&self, identity: &Identity, page: PageRequest) -> Result<Page<User>> {
    let scope = access::scope(identity, KIND, Action::List);
    let query = UserQuery { id: scope.owner_filter(), page };
    let (rows, total) = self.store.list_users(query).await.map_err(storage_error)?;
    Ok(Page::new(rows, total, page))
  }

  pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<User> {
    self.fetch_authorized(identity, id, Action::Read).await
  }

  pub async fn update(&self, identity: &Identity, id: Uuid, patch: UserPatch) -> Result<User> {
    let current = self.fetch_authorized(identity, id, Action::Update).await?;
    let patch = patch.normalize()?;

    if let Some(email) = patch.email.as_deref()
      && email != current.email
      && self
        .store
        .find_user_by_email(email)
        .await
        .map_err(storage_error)?
        .is_some()
    {
      return Err(email_taken());
    }

    let updated = self
      .store
      .update_user(id, &patch)
      .await
      .map_err(|e| match storage_error(e) {
        Error::Conflict(_) => email_taken(),
        other => other,
      })?
      .ok_or_else(not_found)?;

    tracing::info!(user = %id, by = %identity.subject_id, "user updated");
    Ok(updated)
  }

  pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<()> {
    self.fetch_authorized(identity, id, Action::Delete).await?;
    let deleted = self.store.delete_user(id).await.map_err(|e| match storage_error(e) {
      Error::Conflict(_) => {
        Error::Conflict("User still owns policies or claims".to_string())
      }
      other => other,
    })?;
    if !deleted {
      return Err(not_found());
    }
    tracing::info!(user = %id, by = %identity.subject_id, "user deleted");
    Ok(())
  }

  /// Change an account's role. Only admins may do this, including on
  /// themselves.
  pub async fn set_role(&self, identity: &Identity, id: Uuid, role: Role) -> Result<User> {
    access::require_privileged(identity, KIND, Action::Update)
      .into_result(KIND, Action::Update)?;

    let updated = self
      .store
      .set_role(id, role)
      .await
      .map_err(storage_error)?
      .ok_or_else(not_found)?;

    tracing::info!(user = %id, %role, by = %identity.subject_id, "role changed");
    Ok(updated)
  }

  /// Fetch by id without scoping, then apply the record-level check.
  async fn fetch_authorized(
    &self,
    identity: &Identity,
    id: Uuid,
    action: Action,
  ) -> Result<User> {
    let user = self
      .store
      .get_user(id)
      .await
      .map_err(storage_error)?
      .ok_or_else(not_found)?;
    access::authorize_record(identity, &user, KIND, action).into_result(KIND, action)?;
    Ok(user)
  }
}

fn not_found() -> Error { Error::NotFound("User not found".to_string()) }

fn email_taken() -> Error { Error::Conflict("Email already in use".to_string()) }
