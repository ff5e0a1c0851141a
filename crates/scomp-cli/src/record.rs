//! # Record Subcommand
//!
//! Drives the registry lifecycle against the local ledger: encrypted
//! record submission, submitter-gated status updates, access grants,
//! listing, and authorized decryption. Risk levels, statuses, and
//! violation codes are encrypted client-side before submission; only
//! `record decrypt` ever turns a handle back into a plaintext, and only
//! under a signed request the coprocessor accepts.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use scomp_core::{ComplianceStatus, RecordId, RiskLevel};
use scomp_fhe::{DecryptedValue, DecryptionRequest, EncryptedInputBuilder};
use scomp_registry::RegistryEvent;
use scomp_runtime::TxReceipt;

use crate::store::CliStore;

/// Arguments for the `scomp record` subcommand.
#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

/// Record subcommands.
#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Encrypt a risk level and violation code and submit a new record.
    Create {
        /// Submitting account (keystore name).
        #[arg(long)]
        submitter: String,

        /// Risk level to encrypt (low, medium, high, critical).
        #[arg(long)]
        risk: RiskLevel,

        /// Violation code to encrypt.
        #[arg(long)]
        violation_code: u32,
    },

    /// Encrypt a new status and overwrite the record's status handle.
    UpdateStatus {
        /// Calling account (keystore name). Must be the record's submitter.
        #[arg(long)]
        submitter: String,

        /// Record to update.
        #[arg(long)]
        id: u64,

        /// Status to encrypt (pending, approved, rejected, flagged).
        #[arg(long)]
        status: ComplianceStatus,
    },

    /// Authorize another account to decrypt a record's fields.
    GrantAccess {
        /// Calling account (keystore name). Must be the record's submitter.
        #[arg(long)]
        submitter: String,

        /// Record to share.
        #[arg(long)]
        id: u64,

        /// Account to authorize: keystore name or 0x address.
        #[arg(long)]
        user: String,
    },

    /// List records (public metadata only).
    List,

    /// Show one record's metadata and ciphertext handles.
    Show {
        /// Record to show.
        #[arg(long)]
        id: u64,
    },

    /// Decrypt one encrypted field with a signed request.
    Decrypt {
        /// Requesting account (keystore name). Needs a grant unless it
        /// submitted the record.
        #[arg(long)]
        account: String,

        /// Record to read.
        #[arg(long)]
        id: u64,

        /// Which encrypted field to decrypt.
        #[arg(long)]
        field: RecordField,
    },
}

/// Encrypted record fields addressable by `record decrypt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordField {
    /// Write-once risk level, decoded to its name.
    Risk,
    /// Mutable compliance status, decoded to its name.
    Status,
    /// Write-once violation code, printed as a raw integer.
    ViolationCode,
}

/// Execute the record subcommand.
pub fn run_record(args: &RecordArgs, state_path: &Path) -> Result<u8> {
    match &args.command {
        RecordCommand::Create {
            submitter,
            risk,
            violation_code,
        } => cmd_create(submitter, *risk, *violation_code, state_path),
        RecordCommand::UpdateStatus {
            submitter,
            id,
            status,
        } => cmd_update_status(submitter, RecordId::new(*id), *status, state_path),
        RecordCommand::GrantAccess {
            submitter,
            id,
            user,
        } => cmd_grant_access(submitter, RecordId::new(*id), user, state_path),
        RecordCommand::List => cmd_list(state_path),
        RecordCommand::Show { id } => cmd_show(RecordId::new(*id), state_path),
        RecordCommand::Decrypt { account, id, field } => {
            cmd_decrypt(account, RecordId::new(*id), *field, state_path)
        }
    }
}

/// Arguments for `scomp events`.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Only events for this record id.
    #[arg(long)]
    pub record: Option<u64>,

    /// Only events from this submitter: keystore name or 0x address.
    #[arg(long)]
    pub submitter: Option<String>,
}

/// Execute `scomp events`.
pub fn run_events(args: &EventsArgs, state_path: &Path) -> Result<u8> {
    let store = CliStore::load(state_path)?;
    let registry = store.ledger.registry();

    let events: Vec<RegistryEvent> = match (&args.record, &args.submitter) {
        (Some(id), None) => registry.events_for_record(RecordId::new(*id)),
        (None, Some(who)) => registry.events_by_submitter(store.resolve_account(who)?),
        (None, None) => registry.events().to_vec(),
        (Some(_), Some(_)) => bail!("--record and --submitter are mutually exclusive"),
    };

    if events.is_empty() {
        println!("no events");
        return Ok(0);
    }
    for event in &events {
        println!("{event}");
    }
    Ok(0)
}

/// Encrypt both inputs client-side, then submit the creation.
fn cmd_create(
    submitter: &str,
    risk: RiskLevel,
    violation_code: u32,
    state_path: &Path,
) -> Result<u8> {
    let mut store = CliStore::load(state_path)?;
    let caller = store.keys_for(submitter)?.address();
    let contract = store.ledger.registry().address();

    // One batch, one proof: handle 0 is the risk level, handle 1 the
    // violation code.
    let input = EncryptedInputBuilder::new(contract, caller)
        .add_u8(risk.code())
        .add_u32(violation_code)
        .encrypt(store.ledger.engine_mut())
        .context("client-side encryption failed")?;
    let risk_handle = input.handle(0).context("batch is missing the risk handle")?;
    let violation_handle = input
        .handle(1)
        .context("batch is missing the violation handle")?;

    let receipt = store
        .ledger
        .create_record(caller, risk_handle, &input.proof, violation_handle, &input.proof)
        .context("create-record transaction rejected")?;

    store.save(state_path)?;
    println!("OK: {} created", receipt.output);
    print_receipt_lines(&receipt);
    Ok(0)
}

fn cmd_update_status(
    submitter: &str,
    id: RecordId,
    status: ComplianceStatus,
    state_path: &Path,
) -> Result<u8> {
    let mut store = CliStore::load(state_path)?;
    let caller = store.keys_for(submitter)?.address();
    let contract = store.ledger.registry().address();

    let input = EncryptedInputBuilder::new(contract, caller)
        .add_u8(status.code())
        .encrypt(store.ledger.engine_mut())
        .context("client-side encryption failed")?;
    let status_handle = input
        .handle(0)
        .context("batch is missing the status handle")?;

    let receipt = store
        .ledger
        .update_status(caller, id, status_handle, &input.proof)
        .context("update-status transaction rejected")?;

    store.save(state_path)?;
    println!("OK: {id} status set to {}", status.as_str());
    print_receipt_lines(&receipt);
    Ok(0)
}

fn cmd_grant_access(submitter: &str, id: RecordId, user: &str, state_path: &Path) -> Result<u8> {
    let mut store = CliStore::load(state_path)?;
    let caller = store.keys_for(submitter)?.address();
    let grantee = store.resolve_account(user)?;

    let receipt = store
        .ledger
        .grant_access(caller, id, grantee)
        .context("grant-access transaction rejected")?;

    store.save(state_path)?;
    println!("OK: {id} shared with {grantee}");
    print_receipt_lines(&receipt);
    Ok(0)
}

fn cmd_list(state_path: &Path) -> Result<u8> {
    let store = CliStore::load(state_path)?;
    let registry = store.ledger.registry();

    println!("records: {}", registry.record_count());
    for id in registry.all_record_ids() {
        let info = registry.record_info(id);
        println!("{id}  submitter={}  at={}", info.submitter, info.timestamp);
    }
    Ok(0)
}

fn cmd_show(id: RecordId, state_path: &Path) -> Result<u8> {
    let store = CliStore::load(state_path)?;
    let registry = store.ledger.registry();

    let info = registry.record_info(id);
    if !info.exists {
        println!("{id} does not exist");
        return Ok(1);
    }
    println!("{id}");
    println!("  submitter: {}", info.submitter);
    println!("  timestamp: {}", info.timestamp);
    println!("  risk handle: {}", registry.encrypted_risk_level(id));
    println!("  status handle: {}", registry.encrypted_status(id));
    println!("  violation handle: {}", registry.encrypted_violation_code(id));
    println!(
        "  created events: {}",
        registry.events_for_record(id).len()
    );
    Ok(0)
}

fn cmd_decrypt(account: &str, id: RecordId, field: RecordField, state_path: &Path) -> Result<u8> {
    let store = CliStore::load(state_path)?;
    let rendered = decrypt_field(&store, account, id, field)?;
    println!("OK: {id} {} = {rendered}", field_name(field));
    Ok(0)
}

/// Sign a request for the addressed field and decode the plaintext.
fn decrypt_field(
    store: &CliStore,
    account: &str,
    id: RecordId,
    field: RecordField,
) -> Result<String> {
    let keys = store.keys_for(account)?;
    let registry = store.ledger.registry();
    if !registry.record_info(id).exists {
        bail!("{id} does not exist");
    }

    let handle = match field {
        RecordField::Risk => registry.encrypted_risk_level(id),
        RecordField::Status => registry.encrypted_status(id),
        RecordField::ViolationCode => registry.encrypted_violation_code(id),
    };

    let request = DecryptionRequest::sign(&keys, handle)?;
    let value = store
        .ledger
        .decrypt(&request)
        .context("decryption request rejected")?;
    render_field(field, &value)
}

/// Decode a decrypted scalar into its domain meaning.
fn render_field(field: RecordField, value: &DecryptedValue) -> Result<String> {
    match field {
        RecordField::Risk => {
            let code = value.as_u8();
            let risk = RiskLevel::from_code(code)
                .with_context(|| format!("ciphertext held {code}, which is not a risk level"))?;
            Ok(risk.as_str().to_string())
        }
        RecordField::Status => {
            let code = value.as_u8();
            let status = ComplianceStatus::from_code(code)
                .with_context(|| format!("ciphertext held {code}, which is not a status"))?;
            Ok(status.as_str().to_string())
        }
        RecordField::ViolationCode => Ok(value.as_u32().to_string()),
    }
}

fn field_name(field: RecordField) -> &'static str {
    match field {
        RecordField::Risk => "risk",
        RecordField::Status => "status",
        RecordField::ViolationCode => "violation-code",
    }
}

/// Print the block/tx/event lines every transaction shares.
fn print_receipt_lines<T>(receipt: &TxReceipt<T>) {
    println!("  block: {}", receipt.block_number);
    println!("  tx: {}", receipt.tx_hash);
    for event in &receipt.events {
        println!("  event: {event}");
    }
}
