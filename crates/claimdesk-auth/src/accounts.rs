//! Registration and login.
//!
//! Login failures are deliberately indistinguishable: an unknown email and a
//! wrong password produce the same error, and both pay for one argon2
//! verification.

use std::sync::{Arc, OnceLock};

use claimdesk_core::{
  Error, Result,
  service::storage_error,
  store::InsuranceStore,
  user::{NewUser, User, normalize_email},
};
use serde::{Deserialize, Serialize};

use crate::{TokenService, password};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 2;

/// Body of a registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  pub email:    String,
  pub password: String,
  pub name:     String,
}

/// Body of a login request. Missing fields are treated as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
  pub token: String,
}

pub struct AccountService<S> {
  store:  Arc<S>,
  tokens: Arc<TokenService>,
}

impl<S> Clone for AccountService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), tokens: Arc::clone(&self.tokens) }
  }
}

impl<S: InsuranceStore> AccountService<S> {
  /// Computes the placeholder hash eagerly; unknown-email logins cost the
  /// same from the first request on.
  pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
    dummy_hash();
    Self { store, tokens }
  }

  /// Create an account with the default role.
  pub async fn register(&self, input: Registration) -> Result<User> {
    let email = normalize_email(&input.email)?;
    let name = input.name.trim().to_string();
    if input.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::validation(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters long"
      )));
    }
    if name.chars().count() < MIN_NAME_LEN {
      return Err(Error::validation(format!(
        "Name must be at least {MIN_NAME_LEN} characters long"
      )));
    }

    if self
      .store
      .find_user_by_email(&email)
      .await
      .map_err(storage_error)?
      .is_some()
    {
      return Err(email_taken());
    }

    let password_hash = password::hash(&input.password).map_err(|e| {
      tracing::error!(error = %e, "password hashing failed");
      Error::Internal
    })?;

    let user = self
      .store
      .create_user(NewUser { email, name, password_hash })
      .await
      .map_err(|e| match storage_error(e) {
        Error::Conflict(_) => email_taken(),
        other => other,
      })?;

    tracing::info!(user = %user.id, "account registered");
    Ok(user)
  }

  /// Exchange credentials for a bearer token.
  pub async fn login(&self, input: LoginRequest) -> Result<Session> {
    if input.email.trim().is_empty() || input.password.is_empty() {
      return Err(Error::Unauthenticated("Email and password are required".into()));
    }

    let credential = match normalize_email(&input.email) {
      Ok(email) => self.store.get_credential(&email).await.map_err(storage_error)?,
      Err(_) => None,
    };

    let Some(credential) = credential else {
      // Same cost as a real check, so response time does not reveal whether
      // the account exists.
      if let Some(phc) = dummy_hash() {
        let _ = password::verify(&input.password, phc);
      }
      return Err(invalid_credentials());
    };

    if !password::verify(&input.password, &credential.password_hash) {
      tracing::info!(user = %credential.subject_id, "login rejected");
      return Err(invalid_credentials());
    }

    let token = self.tokens.issue(credential.subject_id, &credential.email)?;
    tracing::info!(user = %credential.subject_id, "login succeeded");
    Ok(Session { token })
  }
}

/// Verified against when the email is unknown.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
  DUMMY_HASH
    .get_or_init(|| password::hash("claimdesk-unknown-account").ok())
    .as_deref()
}

fn invalid_credentials() -> Error { Error::Unauthenticated("Invalid credentials".into()) }

fn email_taken() -> Error { Error::Conflict("Email already in use".into()) }

#[cfg(test)]
mod tests {
  use claimdesk_store_sqlite::SqliteStore;

  use super::*;

  async fn accounts() -> AccountService<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    let tokens = TokenService::new("accounts-test-secret").unwrap();
    AccountService::new(Arc::new(store), Arc::new(tokens))
  }

  fn registration(email: &str) -> Registration {
    Registration {
      email:    email.into(),
      password: "hunter2hunter2".into(),
      name:     "Alice Liddell".into(),
    }
  }

  fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest { email: email.into(), password: password.into() }
  }

  #[tokio::test]
  async fn register_then_login_issues_verifiable_token() {
    let svc = accounts().await;
    let user = svc.register(registration("Alice@Example.com")).await.unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, claimdesk_core::identity::Role::User);

    let session = svc.login(login("alice@example.com", "hunter2hunter2")).await.unwrap();
    let verified = svc.tokens.verify(Some(&session.token)).unwrap();
    assert_eq!(verified.subject_id, user.id);
    assert_eq!(verified.email, "alice@example.com");
  }

  #[tokio::test]
  async fn duplicate_email_conflicts() {
    let svc = accounts().await;
    svc.register(registration("bob@example.com")).await.unwrap();
    let err = svc.register(registration("BOB@example.com")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(ref m) if m == "Email already in use"));
  }

  #[tokio::test]
  async fn wrong_password_and_unknown_email_look_the_same() {
    let svc = accounts().await;
    svc.register(registration("carol@example.com")).await.unwrap();

    let wrong = svc.login(login("carol@example.com", "not-the-password")).await.unwrap_err();
    let unknown = svc.login(login("nobody@example.com", "hunter2hunter2")).await.unwrap_err();
    for err in [wrong, unknown] {
      assert!(matches!(err, Error::Unauthenticated(ref m) if m == "Invalid credentials"));
    }
  }

  #[tokio::test]
  async fn placeholder_hash_is_ready_before_any_login() {
    let _svc = accounts().await;
    let hash = DUMMY_HASH.get().and_then(Option::as_deref).expect("hash computed in new");
    assert!(password::verify("claimdesk-unknown-account", hash));
  }

  #[tokio::test]
  async fn missing_login_fields_are_unauthenticated() {
    let svc = accounts().await;
    let err = svc.login(LoginRequest::default()).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
  }

  #[tokio::test]
  async fn weak_registrations_are_rejected() {
    let svc = accounts().await;

    let mut short_pw = registration("dave@example.com");
    short_pw.password = "short".into();
    assert!(matches!(svc.register(short_pw).await, Err(Error::Validation(_))));

    let mut short_name = registration("dave@example.com");
    short_name.name = " D ".into();
    assert!(matches!(svc.register(short_name).await, Err(Error::Validation(_))));

    assert!(matches!(
      svc.register(registration("not-an-email")).await,
      Err(Error::Validation(_))
    ));
  }
}
