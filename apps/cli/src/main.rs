//! # Stockbook CLI
//!
//! Command-line host for the Stockbook ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        stockbook                                        │
//! │                                                                         │
//! │  args ───► clap ───► commands::run ───► stockbook-db ───► SQLite       │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                    render (table) / serde_json (--json)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI owns the clock: "today" is read once here and passed down as the
//! default date for postings and reports.

mod cli;
mod commands;
mod config;
mod render;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Context;
use crate::config::AppConfig;
use stockbook_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let config = AppConfig::load()?.with_db_path(cli.db.clone());
    debug!(?config, "Configuration loaded");

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(DbConfig::new(&config.db_path))
        .await
        .with_context(|| format!("Failed to open ledger at {}", config.db_path.display()))?;
    info!(path = %config.db_path.display(), "Ledger opened");

    let ctx = Context {
        db,
        config,
        json: cli.json,
        today: chrono::Local::now().date_naive(),
    };

    let result = commands::run(&ctx, cli.command).await;
    ctx.db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockbook=trace` - Show trace for stockbook crates only
/// - Default: warnings, plus info from stockbook crates
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,stockbook=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
