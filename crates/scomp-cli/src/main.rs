//! # scomp CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Every subcommand operates on a single JSON state file holding the
//! local ledger and the development keystore.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scomp_cli::account::{run_account, AccountArgs};
use scomp_cli::record::{run_events, run_record, EventsArgs, RecordArgs};
use scomp_cli::store::{run_init, InitArgs};

/// scomp — confidential compliance registry toolchain
///
/// Drives a local ledger: named signing accounts, encrypted record
/// submission, submitter-gated status updates, access grants, and
/// authorized decryption of individual record fields.
#[derive(Parser, Debug)]
#[command(name = "scomp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the JSON state file.
    #[arg(long, default_value = "scomp-state.json", global = true)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a fresh ledger state file.
    Init(InitArgs),

    /// Manage named signing accounts.
    Account(AccountArgs),

    /// Create, update, share, inspect, and decrypt records.
    Record(RecordArgs),

    /// Show record-creation events, optionally filtered.
    Events(EventsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
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

    tracing::debug!(state = %cli.state.display(), "scomp CLI starting");

    let result = match cli.command {
        Commands::Init(args) => run_init(&args, &cli.state),
        Commands::Account(args) => run_account(&args, &cli.state),
        Commands::Record(args) => run_record(&args, &cli.state),
        Commands::Events(args) => run_events(&args, &cli.state),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
