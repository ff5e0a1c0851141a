//! # Local Ledger
//!
//! A single-node transaction harness wrapping the registry and the mock
//! coprocessor in the atomic, serial execution model the registry
//! assumes: each submitted call either fully commits or leaves registry
//! and coprocessor state exactly as it found them.
//!
//! ```text
//! submit ──▶ hash intent ──▶ snapshot ──▶ mint block ──▶ run op
//!                                             │
//!                              Ok ──▶ receipt (block, hash, events)
//!                              Err ─▶ restore snapshot ──▶ error
//! ```
//!
//! Rollback is by value: the engine and registry are cloned before the
//! operation runs and restored wholesale on failure. A rejected
//! transaction still occupies a block; only state rolls back.
//!
//! The block clock is synthetic. Every submission mints one block and
//! advances block time by a fixed interval, which keeps record
//! timestamps deterministic under a fixed genesis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scomp_core::{
    sha256_digest, AccountAddress, CanonicalBytes, CanonicalizationError, ContentDigest,
    ContractAddress, RecordId, Timestamp,
};
use scomp_fhe::{
    CiphertextHandle, DecryptedValue, DecryptionRequest, FheCoprocessor, InputProof,
    MockFheEngine,
};
use scomp_registry::{CallContext, ComplianceRegistry, RegistryError};

use crate::receipt::TxReceipt;

/// Synthetic seconds between consecutive blocks.
pub const DEFAULT_BLOCK_INTERVAL_SECS: u64 = 12;

/// Errors from ledger submission or the read-side decrypt path.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The registry rejected the operation; state was rolled back.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The coprocessor rejected a read-side request.
    #[error(transparent)]
    Fhe(#[from] scomp_fhe::FheError),

    /// The transaction description could not be canonicalized for
    /// hashing. Nothing was mutated.
    #[error("transaction encoding failed: {0}")]
    TxEncoding(#[from] CanonicalizationError),
}

/// In-process ledger: registry plus coprocessor plus block clock.
///
/// Serializable as a whole, so a CLI can persist the entire chain state
/// to a single JSON file and reload it between invocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalLedger {
    engine: MockFheEngine,
    registry: ComplianceRegistry,
    block_number: u64,
    block_time: Timestamp,
    block_interval_secs: u64,
}

impl LocalLedger {
    /// Genesis ledger with block time starting now.
    pub fn new(registry_address: ContractAddress) -> Self {
        Self::genesis_at(
            registry_address,
            Timestamp::now(),
            DEFAULT_BLOCK_INTERVAL_SECS,
        )
    }

    /// Genesis ledger with an explicit clock, for deterministic runs.
    pub fn genesis_at(
        registry_address: ContractAddress,
        genesis_time: Timestamp,
        block_interval_secs: u64,
    ) -> Self {
        Self {
            engine: MockFheEngine::new(),
            registry: ComplianceRegistry::new(registry_address),
            block_number: 0,
            block_time: genesis_time,
            block_interval_secs,
        }
    }

    /// The coprocessor, read-only.
    pub fn engine(&self) -> &MockFheEngine {
        &self.engine
    }

    /// Mutable coprocessor access for client-side encryption. The mock
    /// plays both the wallet SDK and the coprocessor, so inputs are
    /// encrypted against the same engine transactions verify against.
    pub fn engine_mut(&mut self) -> &mut MockFheEngine {
        &mut self.engine
    }

    /// The registry, for read operations. Reads are not transactions.
    pub fn registry(&self) -> &ComplianceRegistry {
        &self.registry
    }

    /// Height of the last minted block.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Time of the last minted block.
    pub fn block_time(&self) -> Timestamp {
        self.block_time
    }

    // ─── Transactions ────────────────────────────────────────────────

    /// Submit a record creation.
    pub fn create_record(
        &mut self,
        caller: AccountAddress,
        risk_handle: CiphertextHandle,
        risk_proof: &InputProof,
        violation_handle: CiphertextHandle,
        violation_proof: &InputProof,
    ) -> Result<TxReceipt<RecordId>, LedgerError> {
        let description = serde_json::json!({
            "op": "create_record",
            "risk_handle": risk_handle,
            "risk_proof": risk_proof,
            "violation_handle": violation_handle,
            "violation_proof": violation_proof,
        });
        self.submit(caller, &description, |registry, engine, ctx| {
            registry.create_record(
                ctx,
                engine,
                risk_handle,
                risk_proof,
                violation_handle,
                violation_proof,
            )
        })
    }

    /// Submit a status update for `id`.
    pub fn update_status(
        &mut self,
        caller: AccountAddress,
        id: RecordId,
        status_handle: CiphertextHandle,
        status_proof: &InputProof,
    ) -> Result<TxReceipt<()>, LedgerError> {
        let description = serde_json::json!({
            "op": "update_status",
            "id": id,
            "status_handle": status_handle,
            "status_proof": status_proof,
        });
        self.submit(caller, &description, |registry, engine, ctx| {
            registry.update_status(ctx, engine, id, status_handle, status_proof)
        })
    }

    /// Submit an access grant on `id` for `user`.
    pub fn grant_access(
        &mut self,
        caller: AccountAddress,
        id: RecordId,
        user: AccountAddress,
    ) -> Result<TxReceipt<()>, LedgerError> {
        let description = serde_json::json!({
            "op": "grant_access",
            "id": id,
            "user": user,
        });
        self.submit(caller, &description, |registry, engine, ctx| {
            registry.grant_access(ctx, engine, id, user)
        })
    }

    // ─── Read-side decryption ────────────────────────────────────────

    /// Release a plaintext through the coprocessor. Not a transaction:
    /// decryption never mutates ledger state.
    pub fn decrypt(&self, request: &DecryptionRequest) -> Result<DecryptedValue, LedgerError> {
        Ok(self.engine.user_decrypt(request)?)
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn submit<T>(
        &mut self,
        caller: AccountAddress,
        description: &serde_json::Value,
        op: impl FnOnce(
            &mut ComplianceRegistry,
            &mut MockFheEngine,
            &CallContext,
        ) -> Result<T, RegistryError>,
    ) -> Result<TxReceipt<T>, LedgerError> {
        let block_number = self.block_number + 1;
        let block_time = self.block_time.add_secs(self.block_interval_secs);
        let tx_hash = self.hash_intent(block_number, caller, description)?;

        let engine_snapshot = self.engine.clone();
        let registry_snapshot = self.registry.clone();
        self.block_number = block_number;
        self.block_time = block_time;

        let events_before = self.registry.events().len();
        let ctx = CallContext::new(caller, block_time);
        match op(&mut self.registry, &mut self.engine, &ctx) {
            Ok(output) => Ok(TxReceipt {
                block_number,
                tx_hash,
                output,
                events: self.registry.events()[events_before..].to_vec(),
            }),
            Err(err) => {
                self.engine = engine_snapshot;
                self.registry = registry_snapshot;
                Err(err.into())
            }
        }
    }

    fn hash_intent(
        &self,
        block_number: u64,
        caller: AccountAddress,
        description: &serde_json::Value,
    ) -> Result<ContentDigest, CanonicalizationError> {
        let tx = serde_json::json!({
            "block": block_number,
            "caller": caller,
            "call": description,
        });
        Ok(sha256_digest(&CanonicalBytes::new(&tx)?))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
