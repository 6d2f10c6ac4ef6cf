//! JSON REST API for claimdesk.
//!
//! Exposes an axum [`Router`] backed by any [`InsuranceStore`]. Every route
//! except register and login requires an `Authorization: Bearer <token>`
//! header; the token is verified and the caller's current role is loaded
//! before a handler runs.

pub mod auth;
pub mod claims;
pub mod error;
pub mod extract;
pub mod policies;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{Method, Uri},
  routing::{get, post, put},
};
use claimdesk_auth::{AccountService, TokenService};
use claimdesk_core::{
  Error,
  service::{ClaimService, PolicyService, UserService},
  store::InsuranceStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CLAIMDESK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// HS256 signing secret. Startup fails if it is empty.
  #[serde(default)]
  pub jwt_secret: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("claimdesk.db") }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. Built once at startup.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub tokens:   Arc<TokenService>,
  pub accounts: AccountService<S>,
  pub policies: PolicyService<S>,
  pub claims:   ClaimService<S>,
  pub users:    UserService<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      tokens:   Arc::clone(&self.tokens),
      accounts: self.accounts.clone(),
      policies: self.policies.clone(),
      claims:   self.claims.clone(),
      users:    self.users.clone(),
    }
  }
}

impl<S: InsuranceStore> AppState<S> {
  pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
    Self {
      accounts: AccountService::new(Arc::clone(&store), Arc::clone(&tokens)),
      policies: PolicyService::new(Arc::clone(&store)),
      claims: ClaimService::new(Arc::clone(&store)),
      users: UserService::new(Arc::clone(&store)),
      store,
      tokens,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router, mounted under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: InsuranceStore + 'static,
{
  let api = Router::new()
    // Auth
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/me", get(auth::me::<S>))
    // Claims
    .route("/claims", get(claims::list::<S>).post(claims::create::<S>))
    .route("/claims/{id}", get(claims::get_one::<S>).patch(claims::update::<S>))
    // Policies
    .route("/policies", get(policies::list::<S>).post(policies::create::<S>))
    .route(
      "/policies/{id}",
      get(policies::get_one::<S>)
        .put(policies::update::<S>)
        .patch(policies::update::<S>),
    )
    // Users
    .route("/users", get(users::list::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .patch(users::update::<S>)
        .delete(users::delete::<S>),
    )
    .route("/users/{id}/role", put(users::set_role::<S>));

  Router::new()
    .nest("/api", api)
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
  ApiError(Error::NotFound(format!("Route {method} {} not found", uri.path())))
}
