// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tally - administrative CLI for the archive-invalidation queue.
//!
//! This is the binary entry point for the `tally` command.

mod invalidate;
mod reset;
mod table;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tally_storage::SqliteStore;

/// Tally - manage stale-archive invalidations for the analytics platform.
#[derive(Parser, Debug)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Mark computed report archives as stale so they get recomputed.
    Invalidate(invalidate::InvalidateArgs),
    /// Reset invalidations stuck in the "in progress" state, allowing
    /// them to be reprocessed.
    ResetInvalidations(reset::ResetArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match tally_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tally_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.platform.log_level);

    let store = SqliteStore::new(config.storage.clone());
    if let Err(err) = tally_core::ArchiveStore::initialize(&store).await {
        eprintln!("{err}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Invalidate(args) => invalidate::run_invalidate(&store, args).await,
        Commands::ResetInvalidations(args) => reset::run_reset(&store, args).await,
    };

    let code = match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    };

    if let Err(err) = tally_core::ArchiveStore::close(&store).await {
        tracing::warn!("close failed: {err}");
    }
    std::process::exit(code);
}

/// Logs go to stderr so command output on stdout stays scriptable.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
