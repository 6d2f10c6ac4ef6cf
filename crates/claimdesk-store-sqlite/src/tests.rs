//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use claimdesk_core::{
  claim::{Claim, ClaimPatch, ClaimStatus, claim_number},
  date,
  identity::Role,
  page::PageRequest,
  policy::{Policy, PolicyPatch, PolicyStatus, PolicyType, policy_number},
  store::{ClaimQuery, InsuranceStore, PolicyQuery, StoreError as _, StoreErrorKind, UserQuery},
  user::{NewUser, User, UserPatch},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str) -> User {
  s.create_user(NewUser {
    email:         email.into(),
    name:          "Test User".into(),
    password_hash: "$argon2id$stub".into(),
  })
  .await
  .unwrap()
}

async fn policy(s: &SqliteStore, owner: Uuid) -> Policy {
  let n = s.count_policies_for_owner(owner).await.unwrap() + 1;
  let start = Utc::now();
  let policy = Policy {
    id:              Uuid::new_v4(),
    policy_number:   policy_number(owner, n),
    owner_id:        owner,
    property_id:     Uuid::new_v4(),
    policy_type:     PolicyType::House,
    status:          PolicyStatus::Active,
    premium:         1200.0,
    coverage_amount: 250_000.0,
    deductible:      500.0,
    start_date:      start,
    end_date:        start + Duration::days(365),
    created_at:      Utc::now(),
  };
  s.insert_policy(&policy).await.unwrap();
  policy
}

fn claim_on(policy: &Policy, n: u64) -> Claim {
  Claim {
    id:            Uuid::new_v4(),
    claim_number:  claim_number(policy.id, n),
    policy_id:     policy.id,
    property_id:   policy.property_id,
    owner_id:      policy.owner_id,
    adjuster_id:   None,
    description:   "Water damage in the kitchen".into(),
    amount:        3400.5,
    incident_date: Utc::now() - Duration::days(3),
    status:        ClaimStatus::Draft,
    created_at:    Utc::now(),
  }
}

fn page(page: u32, limit: u32) -> PageRequest { PageRequest { page, limit } }

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_user() {
  let s = store().await;
  let created = user(&s, "alice@example.com").await;
  assert_eq!(created.role, Role::User);

  let fetched = s.get_user(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "alice@example.com");
  assert_eq!(fetched.role, Role::User);

  let by_email = s.find_user_by_email("alice@example.com").await.unwrap().unwrap();
  assert_eq!(by_email.id, created.id);

  let cred = s.get_credential("alice@example.com").await.unwrap().unwrap();
  assert_eq!(cred.subject_id, created.id);
  assert_eq!(cred.password_hash, "$argon2id$stub");
}

#[tokio::test]
async fn missing_user_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_credential("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  user(&s, "bob@example.com").await;
  let err = s
    .create_user(NewUser {
      email:         "bob@example.com".into(),
      name:          "Other Bob".into(),
      password_hash: "x".into(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::Conflict);
}

#[tokio::test]
async fn update_user_touches_only_given_fields() {
  let s = store().await;
  let u = user(&s, "carol@example.com").await;

  let patch = UserPatch { name: Some("Carol Danvers".into()), email: None };
  let updated = s.update_user(u.id, &patch).await.unwrap().unwrap();
  assert_eq!(updated.name, "Carol Danvers");
  assert_eq!(updated.email, "carol@example.com");
  assert!(updated.updated_at >= u.updated_at);

  assert!(s.update_user(Uuid::new_v4(), &patch).await.unwrap().is_none());
}

#[tokio::test]
async fn set_role_persists() {
  let s = store().await;
  let u = user(&s, "dave@example.com").await;
  let updated = s.set_role(u.id, Role::Adjuster).await.unwrap().unwrap();
  assert_eq!(updated.role, Role::Adjuster);
  assert_eq!(s.get_user(u.id).await.unwrap().unwrap().role, Role::Adjuster);
}

#[tokio::test]
async fn list_users_restricted_to_one_id() {
  let s = store().await;
  let a = user(&s, "a@example.com").await;
  user(&s, "b@example.com").await;
  user(&s, "c@example.com").await;

  let (all, total) = s.list_users(UserQuery::default()).await.unwrap();
  assert_eq!((all.len(), total), (3, 3));

  let (only, total) = s
    .list_users(UserQuery { id: Some(a.id), page: PageRequest::default() })
    .await
    .unwrap();
  assert_eq!(total, 1);
  assert_eq!(only[0].id, a.id);
}

#[tokio::test]
async fn delete_user_without_records() {
  let s = store().await;
  let u = user(&s, "erin@example.com").await;
  assert!(s.delete_user(u.id).await.unwrap());
  assert!(!s.delete_user(u.id).await.unwrap());
  assert!(s.get_user(u.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_user_with_policies_is_refused() {
  let s = store().await;
  let u = user(&s, "frank@example.com").await;
  policy(&s, u.id).await;

  let err = s.delete_user(u.id).await.unwrap_err();
  assert!(matches!(err, Error::HasDependents(id) if id == u.id));
  assert_eq!(err.kind(), StoreErrorKind::Conflict);
  assert!(s.get_user(u.id).await.unwrap().is_some());
}

// ─── Policies ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_policy() {
  let s = store().await;
  let u = user(&s, "gina@example.com").await;
  let p = policy(&s, u.id).await;

  let fetched = s.get_policy(p.id).await.unwrap().unwrap();
  assert_eq!(fetched.policy_number, format!("POL-{}-1", u.id));
  assert_eq!(fetched.policy_type, PolicyType::House);
  assert_eq!(fetched.status, PolicyStatus::Active);
  assert_eq!(fetched.premium, 1200.0);
  assert_eq!(fetched.start_date, p.start_date);

  assert_eq!(s.count_policies_for_owner(u.id).await.unwrap(), 1);
  assert!(s.get_policy(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn policy_for_unknown_owner_is_a_missing_reference() {
  let s = store().await;
  let mut p = Policy {
    id:              Uuid::new_v4(),
    policy_number:   "POL-x-1".into(),
    owner_id:        Uuid::new_v4(),
    property_id:     Uuid::new_v4(),
    policy_type:     PolicyType::Condo,
    status:          PolicyStatus::Pending,
    premium:         1.0,
    coverage_amount: 1.0,
    deductible:      1.0,
    start_date:      Utc::now(),
    end_date:        Utc::now() + Duration::days(1),
    created_at:      Utc::now(),
  };
  let err = s.insert_policy(&p).await.unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::MissingReference);

  let owner = user(&s, "hank@example.com").await;
  p.owner_id = owner.id;
  s.insert_policy(&p).await.unwrap();
}

#[tokio::test]
async fn list_policies_filters_and_scopes() {
  let s = store().await;
  let a = user(&s, "ian@example.com").await;
  let b = user(&s, "jane@example.com").await;
  policy(&s, a.id).await;
  let second = policy(&s, a.id).await;
  policy(&s, b.id).await;

  s.update_policy(second.id, &PolicyPatch { status: Some(PolicyStatus::Expired), ..Default::default() })
    .await
    .unwrap();

  let (_, total) = s.list_policies(PolicyQuery::default()).await.unwrap();
  assert_eq!(total, 3);

  let (mine, total) = s
    .list_policies(PolicyQuery { owner_id: Some(a.id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(total, 2);
  assert!(mine.iter().all(|p| p.owner_id == a.id));

  let (expired, total) = s
    .list_policies(PolicyQuery { status: Some(PolicyStatus::Expired), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(total, 1);
  assert_eq!(expired[0].id, second.id);

  let (_, total) = s
    .list_policies(PolicyQuery { policy_type: Some(PolicyType::Commercial), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(total, 0);
}

#[tokio::test]
async fn update_policy_applies_only_given_fields() {
  let s = store().await;
  let u = user(&s, "kim@example.com").await;
  let p = policy(&s, u.id).await;

  let patch = PolicyPatch { premium: Some(999.0), ..Default::default() };
  let updated = s.update_policy(p.id, &patch).await.unwrap().unwrap();
  assert_eq!(updated.premium, 999.0);
  assert_eq!(updated.coverage_amount, p.coverage_amount);
  assert_eq!(updated.policy_type, p.policy_type);
  assert_eq!(updated.policy_number, p.policy_number);

  assert!(s.update_policy(Uuid::new_v4(), &patch).await.unwrap().is_none());
}

// ─── Claims ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_claim() {
  let s = store().await;
  let u = user(&s, "lee@example.com").await;
  let p = policy(&s, u.id).await;
  let c = claim_on(&p, 1);
  s.insert_claim(&c).await.unwrap();

  let fetched = s.get_claim(c.id).await.unwrap().unwrap();
  assert_eq!(fetched.claim_number, format!("CLM-{}-1", p.id));
  assert_eq!(fetched.owner_id, u.id);
  assert_eq!(fetched.status, ClaimStatus::Draft);
  assert_eq!(fetched.adjuster_id, None);
  assert_eq!(s.count_claims_for_policy(p.id).await.unwrap(), 1);
}

#[tokio::test]
async fn claim_against_missing_policy_is_a_missing_reference() {
  let s = store().await;
  let u = user(&s, "mia@example.com").await;
  let mut p = policy(&s, u.id).await;
  p.id = Uuid::new_v4();

  let err = s.insert_claim(&claim_on(&p, 1)).await.unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::MissingReference);
}

#[tokio::test]
async fn list_claims_pages_newest_first() {
  let s = store().await;
  let a = user(&s, "ned@example.com").await;
  let b = user(&s, "olga@example.com").await;
  let pa = policy(&s, a.id).await;
  let pb = policy(&s, b.id).await;

  let base = Utc::now();
  for i in 0..45u32 {
    let p = if i % 3 == 0 { &pa } else { &pb };
    let mut c = claim_on(p, u64::from(i) + 1);
    c.created_at = base + Duration::seconds(i64::from(i));
    s.insert_claim(&c).await.unwrap();
  }

  let (rows, total) = s
    .list_claims(ClaimQuery { owner_id: Some(a.id), page: page(1, 10), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(total, 15);
  assert_eq!(rows.len(), 10);
  assert!(rows.iter().all(|c| c.owner_id == a.id));
  assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));

  let (rows, _) = s
    .list_claims(ClaimQuery { owner_id: Some(a.id), page: page(2, 10), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(rows.len(), 5);

  let (rows, total) = s
    .list_claims(ClaimQuery { page: page(3, 20), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(total, 45);
  assert_eq!(rows.len(), 5);

  let (_, total) = s
    .list_claims(ClaimQuery { policy_id: Some(pb.id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(total, 30);
}

#[tokio::test]
async fn update_claim_status_and_adjuster() {
  let s = store().await;
  let owner = user(&s, "pat@example.com").await;
  let adjuster = user(&s, "quinn@example.com").await;
  let p = policy(&s, owner.id).await;
  let c = claim_on(&p, 1);
  s.insert_claim(&c).await.unwrap();

  let patch = ClaimPatch {
    status: Some(ClaimStatus::UnderReview),
    adjuster_id: Some(Some(adjuster.id)),
    ..Default::default()
  };
  let updated = s.update_claim(c.id, &patch).await.unwrap().unwrap();
  assert_eq!(updated.status, ClaimStatus::UnderReview);
  assert_eq!(updated.adjuster_id, Some(adjuster.id));
  assert_eq!(updated.description, c.description);

  let (rows, _) = s
    .list_claims(ClaimQuery { status: Some(ClaimStatus::UnderReview), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);

  let unknown = ClaimPatch { adjuster_id: Some(Some(Uuid::new_v4())), ..Default::default() };
  let err = s.update_claim(c.id, &unknown).await.unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::MissingReference);

  let cleared = ClaimPatch { adjuster_id: Some(None), ..Default::default() };
  let updated = s.update_claim(c.id, &cleared).await.unwrap().unwrap();
  assert_eq!(updated.adjuster_id, None);
  assert_eq!(updated.status, ClaimStatus::UnderReview);
}

#[tokio::test]
async fn created_records_read_back_identically() {
  let s = store().await;
  let u = user(&s, "rae@example.com").await;
  assert_eq!(s.get_user(u.id).await.unwrap().unwrap().created_at, u.created_at);

  let p = policy(&s, u.id).await;
  let mut c = claim_on(&p, 1);
  c.created_at = date::now();
  s.insert_claim(&c).await.unwrap();
  assert_eq!(s.get_claim(c.id).await.unwrap().unwrap().created_at, c.created_at);
}

#[tokio::test]
async fn opening_a_file_store_twice_keeps_data() {
  let dir = std::env::temp_dir().join(format!("claimdesk-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    user(&s, "rose@example.com").await.id
  };
  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_user(id).await.unwrap().is_some());

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
