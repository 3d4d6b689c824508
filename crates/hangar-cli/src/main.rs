//! `hangar` — command-line front end for the component-records store.
//!
//! # Usage
//!
//! ```
//! hangar --db fleet.db aircraft add --serial 41035 --registration EC-ABC
//! hangar --db fleet.db asset register --part-number 331-500-1010 --serial A1
//! hangar --db fleet.db asset install <id> --aircraft EC-ABC --date 2024-01-01
//! hangar --db fleet.db tree EC-ABC
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use hangar_core::engine::MoveEngine;
use hangar_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hangar", about = "Fleet component maintenance records", version)]
struct Cli {
  /// Path to the SQLite store file.
  #[arg(long, env = "HANGAR_DB", default_value = "hangar.db")]
  db: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Manage aircraft and their counter state.
  #[command(subcommand)]
  Aircraft(commands::AircraftCommand),

  /// Register, move, and inspect component assets.
  #[command(subcommand)]
  Asset(commands::AssetCommand),

  /// Print the installation tree of an aircraft.
  Tree {
    /// Aircraft registration or serial number.
    key: String,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let store = SqliteStore::open(&cli.db)
    .await
    .with_context(|| format!("failed to open store at {:?}", cli.db))?;
  let engine = MoveEngine::new(store.clone());

  match cli.command {
    Command::Aircraft(cmd) => commands::aircraft(&store, cmd).await,
    Command::Asset(cmd) => commands::asset(&store, &engine, cmd).await,
    Command::Tree { key } => commands::tree(&store, &key).await,
  }
}
