//! # vcw CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vcw_cli::keys::run_backfill;
use vcw_cli::seed::run_seed;
use vcw_cli::verify::run_verify;
use vcw_cli::{database_lifecycle, offline_lifecycle};

/// Credential wallet operator CLI.
///
/// Maintenance commands for the wallet database plus offline verification
/// of credentials and presentations.
#[derive(Parser, Debug)]
#[command(name = "vcw", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate signing keys for users that have none.
    BackfillKeys,

    /// Create the users listed in a YAML file.
    SeedUsers {
        /// Path to the seed file.
        file: PathBuf,
    },

    /// Verify a credential or presentation stored as JSON.
    Verify {
        /// Path to the JSON document.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Commands::BackfillKeys => run_backfill(&database_lifecycle().await?).await,
            Commands::SeedUsers { file } => run_seed(&database_lifecycle().await?, &file).await,
            Commands::Verify { file } => run_verify(&offline_lifecycle()?, &file).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
