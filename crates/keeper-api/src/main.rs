//! Contact Keeper server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `KEEPER_*` environment variables over it, opens the SQLite store, and
//! serves the JSON API over HTTP.
//!
//! The only required setting is the token secret:
//!
//! ```sh
//! KEEPER_JWT_SECRET=change-me cargo run -p keeper-api --bin server
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use keeper_api::{AppState, ServerConfig, auth::TokenKeys};
use keeper_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Contact Keeper API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // RUST_LOG narrows or widens this; INFO when unset.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Defaults, then the TOML file if present, then KEEPER_* variables.
  let settings = config::Config::builder()
    .set_default("store_path", "contacts.db")
    .context("failed to set config defaults")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("KEEPER"))
    .build()
    .context("failed to load configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("invalid server configuration")?;

  if server_cfg.jwt_secret.trim().is_empty() {
    anyhow::bail!("jwt_secret must be set (config file or KEEPER_JWT_SECRET)");
  }
  let Some(token_ttl) = server_cfg.token_ttl() else {
    anyhow::bail!(
      "token_ttl_secs must be a positive number of seconds, got {}",
      server_cfg.token_ttl_secs,
    );
  };

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open contact store at {store_path:?}"))?;

  let state = AppState {
    store: Arc::new(store),
    keys:  Arc::new(TokenKeys::new(&server_cfg.jwt_secret, token_ttl)),
  };

  let app = keeper_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(%address, "contact keeper listening");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("HTTP server stopped unexpectedly")?;

  Ok(())
}

/// `~/contacts.db` resolves under `$HOME`; anything else is returned as is.
fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
