//! catalog server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `CATALOG_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! # Admin accounts
//!
//! Open registration only creates buyers and sellers. To provision an admin,
//! enter a password on stdin:
//!
//! ```
//! cargo run -p catalog-server --bin server -- --create-admin root@example.com
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use catalog_core::service::Catalog;
use catalog_server::{create_admin, expand_tilde, load_config, router};
use catalog_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Catalog API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create an admin account with this email (password read from stdin)
  /// and exit.
  #[arg(long, value_name = "EMAIL")]
  create_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = load_config(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let catalog = Arc::new(Catalog::new(store));

  // Helper mode: provision an admin and exit.
  if let Some(email) = cli.create_admin {
    let password = read_password()?;
    let admin = create_admin(&catalog, &email, &password).await?;
    println!("created admin {} ({})", admin.email, admin.user_id);
    return Ok(());
  }

  let app = router(catalog);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read password")?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
