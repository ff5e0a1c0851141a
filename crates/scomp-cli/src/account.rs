//! # Account Subcommand
//!
//! Named Ed25519 accounts for attributing transactions and signing
//! decryption requests. Key material lives in the state file's
//! keystore; commands reference accounts by name.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::store::CliStore;

/// Arguments for the `scomp account` subcommand.
#[derive(Args, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

/// Account subcommands.
#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Generate a keypair and register it under a name.
    New {
        /// Name other commands use to reference the account.
        #[arg(long)]
        name: String,
    },

    /// List registered accounts and their addresses.
    List,
}

/// Execute the account subcommand.
pub fn run_account(args: &AccountArgs, state_path: &Path) -> Result<u8> {
    match &args.command {
        AccountCommand::New { name } => cmd_new(name, state_path),
        AccountCommand::List => cmd_list(state_path),
    }
}

fn cmd_new(name: &str, state_path: &Path) -> Result<u8> {
    let mut store = CliStore::load(state_path)?;
    let address = store.add_account(name)?;
    store.save(state_path)?;

    println!("OK: account '{name}' created");
    println!("  address: {address}");
    Ok(0)
}

fn cmd_list(state_path: &Path) -> Result<u8> {
    let store = CliStore::load(state_path)?;
    if store.accounts.is_empty() {
        println!("no accounts registered");
        return Ok(0);
    }
    for name in store.accounts.keys() {
        let address = store.keys_for(name)?.address();
        println!("{name}  {address}");
    }
    Ok(0)
}
