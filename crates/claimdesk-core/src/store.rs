//! The `InsuranceStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `claimdesk-store-sqlite`). Services in this crate depend on the
//! abstraction, never on a concrete backend; a store handle is constructed
//! once at startup and injected into every service.

use std::future::Future;

use uuid::Uuid;

use crate::{
  claim::{Claim, ClaimPatch, ClaimStatus},
  identity::Role,
  page::PageRequest,
  policy::{Policy, PolicyPatch, PolicyStatus, PolicyType},
  user::{Credential, NewUser, User, UserPatch},
};

// ─── Error contract ──────────────────────────────────────────────────────────

/// Classification every backend error must report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// The addressed row does not exist.
  NotFound,
  /// A uniqueness constraint was violated.
  Conflict,
  /// A referenced row (e.g. a claim's policy) does not exist.
  MissingReference,
  /// Anything else; never shown to callers.
  Backend,
}

pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`InsuranceStore::list_policies`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyQuery {
  /// Restrict to rows owned by this subject.
  pub owner_id:    Option<Uuid>,
  pub status:      Option<PolicyStatus>,
  pub policy_type: Option<PolicyType>,
  pub page:        PageRequest,
}

/// Parameters for [`InsuranceStore::list_claims`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimQuery {
  /// Restrict to rows owned by this subject.
  pub owner_id:  Option<Uuid>,
  pub status:    Option<ClaimStatus>,
  pub policy_id: Option<Uuid>,
  pub page:      PageRequest,
}

/// Parameters for [`InsuranceStore::list_users`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UserQuery {
  /// Restrict to this single account.
  pub id:   Option<Uuid>,
  pub page: PageRequest,
}

/// Rows of one page plus the size of the whole filtered set.
pub type Listing<T> = (Vec<T>, u64);

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a claimdesk storage backend.
///
/// Each method is a single storage operation; nothing here spans a
/// transaction across calls. Lookups by id return `Ok(None)` for absent rows.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait InsuranceStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account with the default role. Fails with a
  /// [`StoreErrorKind::Conflict`] error if the email is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// The stored credential for `email`, if any.
  fn get_credential<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
    query: UserQuery,
  ) -> impl Future<Output = Result<Listing<User>, Self::Error>> + Send + '_;

  /// Apply only the provided fields. Returns `None` if the user is absent.
  fn update_user<'a>(
    &'a self,
    id: Uuid,
    patch: &'a UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn set_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Returns `false` if the user was absent.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Policies ──────────────────────────────────────────────────────────

  /// Number of policies owned by `owner_id`.
  fn count_policies_for_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn insert_policy<'a>(
    &'a self,
    policy: &'a Policy,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_policy(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Policy>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_policies(
    &self,
    query: PolicyQuery,
  ) -> impl Future<Output = Result<Listing<Policy>, Self::Error>> + Send + '_;

  /// Apply only the provided fields. Returns `None` if the policy is absent.
  fn update_policy<'a>(
    &'a self,
    id: Uuid,
    patch: &'a PolicyPatch,
  ) -> impl Future<Output = Result<Option<Policy>, Self::Error>> + Send + 'a;

  // ── Claims ────────────────────────────────────────────────────────────

  /// Number of claims filed against `policy_id`.
  fn count_claims_for_policy(
    &self,
    policy_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Fails with [`StoreErrorKind::MissingReference`] if the policy is absent.
  fn insert_claim<'a>(
    &'a self,
    claim: &'a Claim,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_claim(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_claims(
    &self,
    query: ClaimQuery,
  ) -> impl Future<Output = Result<Listing<Claim>, Self::Error>> + Send + '_;

  /// Apply only the provided fields. Returns `None` if the claim is absent.
  fn update_claim<'a>(
    &'a self,
    id: Uuid,
    patch: &'a ClaimPatch,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + 'a;
}
