//! # Confidential Compliance Registry
//!
//! A sequentially-indexed, append-mostly store of encrypted compliance
//! records. The registry owns all mutable ledger state (`count`,
//! `records`, `access_grants`, the event log) and mutates it only through
//! its three entry points:
//!
//! ```text
//! create_record ──▶ verify proofs ──▶ derive status homomorphically ──▶ append
//! update_status ──▶ submitter gate ──▶ verify proof ──▶ replace handle
//! grant_access  ──▶ submitter gate ──▶ ACL allows    ──▶ record grant
//! ```
//!
//! Status derivation happens entirely in the ciphertext domain: an
//! encrypted `>=` against the flagging boundary plus an encrypted select
//! between the Flagged and Pending constants. The registry never observes
//! a plaintext risk level, status, or violation code.
//!
//! ## Security Invariant
//!
//! - Only the submitter may update a record's status or grant access.
//! - Every handle stored for an existing record is non-zero and carries
//!   ACL entries for the contract and the submitter.
//! - Standing grants survive status replacement: the new status handle is
//!   re-allowed for every grantee before it lands in the record.
//! - Reads never fail. Writes fail loudly and must leave state untouched
//!   (the surrounding ledger enforces the rollback).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scomp_core::{
    AccountAddress, ComplianceStatus, ContractAddress, RecordId, Timestamp, FLAG_RISK_THRESHOLD,
};
use scomp_fhe::{CiphertextHandle, FheCoprocessor, FheError, FheScalarKind, InputProof};

use crate::event::RegistryEvent;
use crate::record::{Record, RecordInfo};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from registry write operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller is not the record's submitter.
    #[error("Only submitter can update")]
    NotSubmitter,

    /// The id names no allocated record.
    #[error("record {id} does not exist")]
    RecordNotFound {
        /// The unallocated id.
        id: RecordId,
    },

    /// The FHE coprocessor rejected an operation.
    #[error(transparent)]
    Fhe(#[from] FheError),
}

// ─── Call Context ────────────────────────────────────────────────────

/// Ambient facts about the transaction a registry call executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The authenticated account invoking the operation.
    pub caller: AccountAddress,
    /// The current block time.
    pub block_time: Timestamp,
}

impl CallContext {
    /// Context for `caller` at `block_time`.
    pub fn new(caller: AccountAddress, block_time: Timestamp) -> Self {
        Self { caller, block_time }
    }
}

// ─── Registry ────────────────────────────────────────────────────────

/// The compliance registry state machine.
///
/// Ids are dense: after `n` successful creations the allocated ids are
/// exactly `0..n`, regardless of how many interleaved calls failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplianceRegistry {
    address: ContractAddress,
    count: u64,
    records: BTreeMap<RecordId, Record>,
    access_grants: BTreeSet<(RecordId, AccountAddress)>,
    events: Vec<RegistryEvent>,
}

impl ComplianceRegistry {
    /// An empty registry deployed at `address`.
    pub fn new(address: ContractAddress) -> Self {
        Self {
            address,
            count: 0,
            records: BTreeMap::new(),
            access_grants: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    /// The contract address proofs must be bound to.
    pub fn address(&self) -> ContractAddress {
        self.address
    }

    // ─── Writes ──────────────────────────────────────────────────────

    /// Create a record from externally encrypted risk level and violation
    /// code handles, deriving the initial status homomorphically.
    ///
    /// Both proofs must bind their handle to this registry's address and
    /// the calling account. Any authenticated caller may create a record;
    /// the only failure path is proof or coprocessor rejection.
    pub fn create_record<F>(
        &mut self,
        ctx: &CallContext,
        engine: &mut F,
        risk_handle: CiphertextHandle,
        risk_proof: &InputProof,
        violation_handle: CiphertextHandle,
        violation_proof: &InputProof,
    ) -> Result<RecordId, RegistryError>
    where
        F: FheCoprocessor + ?Sized,
    {
        engine.verify_input(risk_handle, risk_proof, self.address, ctx.caller)?;
        engine.verify_input(violation_handle, violation_proof, self.address, ctx.caller)?;

        let status = derive_initial_status(engine, risk_handle)?;

        for handle in [risk_handle, status, violation_handle] {
            engine.allow_contract(handle, self.address)?;
            engine.allow(handle, ctx.caller)?;
        }

        let id = RecordId::new(self.count);
        self.records.insert(
            id,
            Record {
                id,
                submitter: ctx.caller,
                timestamp: ctx.block_time,
                encrypted_risk_level: risk_handle,
                encrypted_status: status,
                encrypted_violation_code: violation_handle,
            },
        );
        self.count += 1;
        self.events.push(RegistryEvent::RecordCreated {
            record_id: id,
            submitter: ctx.caller,
            timestamp: ctx.block_time,
        });
        Ok(id)
    }

    /// Replace a record's encrypted status with an externally encrypted
    /// handle. Submitter-only; any status may overwrite any other.
    ///
    /// The replacement handle is re-allowed for the contract, the
    /// submitter, and every standing grantee, so decryption access
    /// survives the overwrite.
    pub fn update_status<F>(
        &mut self,
        ctx: &CallContext,
        engine: &mut F,
        id: RecordId,
        status_handle: CiphertextHandle,
        status_proof: &InputProof,
    ) -> Result<(), RegistryError>
    where
        F: FheCoprocessor + ?Sized,
    {
        let record = self
            .records
            .get(&id)
            .ok_or(RegistryError::RecordNotFound { id })?;
        if record.submitter != ctx.caller {
            return Err(RegistryError::NotSubmitter);
        }

        engine.verify_input(status_handle, status_proof, self.address, ctx.caller)?;
        engine.allow_contract(status_handle, self.address)?;
        engine.allow(status_handle, ctx.caller)?;
        for grantee in self.grantees(id) {
            engine.allow(status_handle, grantee)?;
        }

        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::RecordNotFound { id })?;
        record.encrypted_status = status_handle;
        Ok(())
    }

    /// Grant `user` standing permission to decrypt all of a record's
    /// fields. Submitter-only; granting twice is a no-op.
    pub fn grant_access<F>(
        &mut self,
        ctx: &CallContext,
        engine: &mut F,
        id: RecordId,
        user: AccountAddress,
    ) -> Result<(), RegistryError>
    where
        F: FheCoprocessor + ?Sized,
    {
        let record = self
            .records
            .get(&id)
            .ok_or(RegistryError::RecordNotFound { id })?;
        if record.submitter != ctx.caller {
            return Err(RegistryError::NotSubmitter);
        }

        for handle in [
            record.encrypted_risk_level,
            record.encrypted_status,
            record.encrypted_violation_code,
        ] {
            engine.allow(handle, user)?;
        }
        self.access_grants.insert((id, user));
        Ok(())
    }

    // ─── Reads (never fail) ──────────────────────────────────────────

    /// Number of successful creations so far.
    pub fn record_count(&self) -> u64 {
        self.count
    }

    /// All allocated ids, ascending. Dense: exactly `0..record_count()`.
    pub fn all_record_ids(&self) -> Vec<RecordId> {
        self.records.keys().copied().collect()
    }

    /// The stored record, if allocated.
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Plaintext metadata for `id`. Soft-fail: an unallocated id yields
    /// `exists: false` with zeroed fields.
    pub fn record_info(&self, id: RecordId) -> RecordInfo {
        self.records
            .get(&id)
            .map(RecordInfo::from_record)
            .unwrap_or_else(|| RecordInfo::missing(id))
    }

    /// The encrypted risk level handle, or the zero handle if `id` is
    /// unallocated.
    pub fn encrypted_risk_level(&self, id: RecordId) -> CiphertextHandle {
        self.records
            .get(&id)
            .map_or(CiphertextHandle::ZERO, |r| r.encrypted_risk_level)
    }

    /// The encrypted status handle, or the zero handle if `id` is
    /// unallocated.
    pub fn encrypted_status(&self, id: RecordId) -> CiphertextHandle {
        self.records
            .get(&id)
            .map_or(CiphertextHandle::ZERO, |r| r.encrypted_status)
    }

    /// The encrypted violation code handle, or the zero handle if `id` is
    /// unallocated.
    pub fn encrypted_violation_code(&self, id: RecordId) -> CiphertextHandle {
        self.records
            .get(&id)
            .map_or(CiphertextHandle::ZERO, |r| r.encrypted_violation_code)
    }

    /// Whether `user` holds an explicit grant on `id`. The submitter's
    /// own access is implicit and not reported here.
    pub fn has_access(&self, id: RecordId, user: AccountAddress) -> bool {
        self.access_grants.contains(&(id, user))
    }

    // ─── Event log ───────────────────────────────────────────────────

    /// The full event log, oldest first.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Events concerning one record.
    pub fn events_for_record(&self, id: RecordId) -> Vec<RegistryEvent> {
        self.events
            .iter()
            .filter(|e| e.record_id() == id)
            .cloned()
            .collect()
    }

    /// Events emitted for one submitter's records.
    pub fn events_by_submitter(&self, submitter: AccountAddress) -> Vec<RegistryEvent> {
        self.events
            .iter()
            .filter(|e| e.submitter() == submitter)
            .cloned()
            .collect()
    }

    fn grantees(&self, id: RecordId) -> Vec<AccountAddress> {
        self.access_grants
            .iter()
            .filter(|(granted_id, _)| *granted_id == id)
            .map(|(_, user)| *user)
            .collect()
    }
}

/// Derive the initial encrypted status from an encrypted risk level:
/// `Flagged` when `risk >= FLAG_RISK_THRESHOLD`, else `Pending`, computed
/// without decrypting anything.
fn derive_initial_status<F>(
    engine: &mut F,
    risk_handle: CiphertextHandle,
) -> Result<CiphertextHandle, FheError>
where
    F: FheCoprocessor + ?Sized,
{
    let boundary =
        engine.trivial_encrypt(u64::from(FLAG_RISK_THRESHOLD.code()), FheScalarKind::U8)?;
    let is_high = engine.ge(risk_handle, boundary)?;
    let flagged =
        engine.trivial_encrypt(u64::from(ComplianceStatus::Flagged.code()), FheScalarKind::U8)?;
    let pending =
        engine.trivial_encrypt(u64::from(ComplianceStatus::Pending.code()), FheScalarKind::U8)?;
    engine.select(is_high, flagged, pending)
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use scomp_core::RiskLevel;
    use scomp_fhe::{EncryptedInputBuilder, MockFheEngine};

    proptest! {
        /// After any sequence of creations, including rejected ones,
        /// the allocated ids are exactly 0..successes.
        #[test]
        fn prop_ids_stay_dense(
            steps in proptest::collection::vec((0u8..4, any::<bool>()), 1..12),
        ) {
            let mut engine = MockFheEngine::new();
            let mut reg = ComplianceRegistry::new(ContractAddress::from_label("prop-registry"));
            let caller = AccountAddress([0x21; 20]);
            let outsider = AccountAddress([0x22; 20]);
            let ctx = CallContext::new(caller, Timestamp::unix_epoch());

            let mut successes = 0u64;
            for (i, (code, sabotage)) in steps.iter().enumerate() {
                let risk = RiskLevel::from_code(*code).unwrap();
                // Sabotaged attempts submit an input encrypted for
                // someone else; the binding check rejects them.
                let owner = if *sabotage { outsider } else { caller };
                let input = EncryptedInputBuilder::new(reg.address(), owner)
                    .add_u8(risk.code())
                    .add_u32(i as u32)
                    .encrypt(&mut engine)
                    .unwrap();
                let result = reg.create_record(
                    &ctx,
                    &mut engine,
                    input.handles[0],
                    &input.proof,
                    input.handles[1],
                    &input.proof,
                );
                if *sabotage {
                    prop_assert!(result.is_err());
                } else {
                    prop_assert_eq!(result.unwrap(), RecordId::new(successes));
                    successes += 1;
                }
                prop_assert_eq!(reg.record_count(), successes);
            }

            let ids = reg.all_record_ids();
            prop_assert_eq!(ids.len() as u64, successes);
            for (i, id) in ids.iter().enumerate() {
                prop_assert_eq!(*id, RecordId::new(i as u64));
            }
        }

        /// Non-submitters can never mutate status, whatever they send.
        #[test]
        fn prop_non_submitter_never_updates(code in 0u8..3) {
            let mut engine = MockFheEngine::new();
            let mut reg = ComplianceRegistry::new(ContractAddress::from_label("prop-registry"));
            let submitter = AccountAddress([0x31; 20]);
            let intruder = AccountAddress([0x32; 20]);
            let ctx_submitter = CallContext::new(submitter, Timestamp::unix_epoch());
            let ctx_intruder = CallContext::new(intruder, Timestamp::unix_epoch());

            let input = EncryptedInputBuilder::new(reg.address(), submitter)
                .add_u8(0)
                .add_u32(0)
                .encrypt(&mut engine)
                .unwrap();
            let id = reg
                .create_record(
                    &ctx_submitter,
                    &mut engine,
                    input.handles[0],
                    &input.proof,
                    input.handles[1],
                    &input.proof,
                )
                .unwrap();
            let before = reg.encrypted_status(id);

            let attack = EncryptedInputBuilder::new(reg.address(), intruder)
                .add_u8(code)
                .encrypt(&mut engine)
                .unwrap();
            let result = reg.update_status(
                &ctx_intruder,
                &mut engine,
                id,
                attack.handles[0],
                &attack.proof,
            );
            prop_assert!(result.is_err());
            prop_assert_eq!(reg.encrypted_status(id), before);
        }
    }
}
