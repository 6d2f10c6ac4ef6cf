//! claimdesk server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `CLAIMDESK_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Granting a role
//!
//! New accounts always start as `USER`. To bootstrap the first administrator:
//!
//! ```text
//! cargo run -p claimdesk-api --bin server -- --grant admin@example.com --role ADMIN
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use claimdesk_api::{AppState, ServerConfig};
use claimdesk_auth::TokenService;
use claimdesk_core::{identity::Role, store::InsuranceStore as _, user::normalize_email};
use claimdesk_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "claimdesk API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Change the role of the account with this email, then exit.
  #[arg(long, value_name = "EMAIL", requires = "role")]
  grant: Option<String>,

  /// Role to assign with `--grant` (ADMIN, ADJUSTER, AGENT or USER).
  #[arg(long, requires = "grant")]
  role: Option<Role>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CLAIMDESK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: change a role and exit.
  if let (Some(email), Some(role)) = (cli.grant, cli.role) {
    return grant_role(&store, &email, role).await;
  }

  let tokens = TokenService::new(&server_cfg.jwt_secret)
    .context("jwt_secret must be set (config file or CLAIMDESK_JWT_SECRET)")?;

  let state = AppState::new(Arc::new(store), Arc::new(tokens));
  let app = claimdesk_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn grant_role(store: &SqliteStore, email: &str, role: Role) -> anyhow::Result<()> {
  let email = normalize_email(email)?;
  let user = store
    .find_user_by_email(&email)
    .await?
    .with_context(|| format!("no account registered for {email}"))?;

  store
    .set_role(user.id, role)
    .await?
    .with_context(|| format!("account {} disappeared", user.id))?;

  tracing::info!(user = %user.id, %role, "role granted");
  println!("{email} is now {role}");
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
