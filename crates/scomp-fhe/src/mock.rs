//! # Mock FHE Coprocessor
//!
//! A deterministic, in-memory [`FheCoprocessor`] for development and
//! testing. No real encryption happens: values are sealed in a private
//! table keyed by handle, and "proofs" are SHA-256 digests recomputed
//! from canonical content at verification time.
//!
//! The mock preserves every property the registry relies on:
//!
//! - Handles are minted from a counter digest and are never zero.
//! - Input proofs bind handles to one (contract, user) pair and are
//!   single-use: verification retires the binding.
//! - The ACL gates decryption exactly as a real coprocessor would.
//! - The whole engine is `Clone` + `Serialize`, so a ledger can snapshot
//!   it before a transaction and roll back on failure.
//!
//! ## Security Invariant
//!
//! Sealed plaintexts never appear in `Debug` output. The engine's `Debug`
//! impl prints table sizes only.

use std::collections::{BTreeMap, BTreeSet};

use scomp_core::{sha256_digest, AccountAddress, CanonicalBytes, ContentDigest, ContractAddress};
use serde::{Deserialize, Serialize};

use crate::coprocessor::{DecryptedValue, FheCoprocessor, FheError};
use crate::handle::{CiphertextHandle, FheScalarKind, InputProof};
use crate::input::EncryptedInput;
use crate::keys::DecryptionRequest;

/// A plaintext sealed behind a handle. Private to the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
struct SealedValue {
    kind: FheScalarKind,
    value: u64,
}

/// One ACL entry: either an account with decryption access or a contract
/// with compute access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
enum AclEntry {
    Account(AccountAddress),
    Contract(ContractAddress),
}

/// A pending input binding: which (contract, user) pair an externally
/// encrypted handle was produced for, and the digest its proof must carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
struct InputBinding {
    contract: ContractAddress,
    user: AccountAddress,
    digest: ContentDigest,
}

/// Deterministic in-memory FHE engine.
///
/// Two engines fed the same call sequence mint identical handles, which
/// keeps fixtures and cross-process tests stable.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MockFheEngine {
    ciphertexts: BTreeMap<CiphertextHandle, SealedValue>,
    acl: BTreeMap<CiphertextHandle, BTreeSet<AclEntry>>,
    pending_inputs: BTreeMap<CiphertextHandle, InputBinding>,
    mint_counter: u64,
}

impl MockFheEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ciphertexts currently sealed.
    pub fn ciphertext_count(&self) -> usize {
        self.ciphertexts.len()
    }

    /// Mint a fresh handle from the counter digest. Never zero: the
    /// handle is a SHA-256 output over a unique canonical payload.
    fn mint_handle(&mut self, kind: FheScalarKind) -> Result<CiphertextHandle, FheError> {
        self.mint_counter += 1;
        let canonical = CanonicalBytes::new(&serde_json::json!({
            "counter": self.mint_counter,
            "kind": kind,
        }))
        .map_err(|e| FheError::Canonicalization(e.to_string()))?;
        Ok(CiphertextHandle(*sha256_digest(&canonical).as_bytes()))
    }

    fn resolve(&self, handle: CiphertextHandle) -> Result<SealedValue, FheError> {
        self.ciphertexts
            .get(&handle)
            .copied()
            .ok_or(FheError::UnknownHandle { handle })
    }

    fn seal(&mut self, kind: FheScalarKind, value: u64) -> Result<CiphertextHandle, FheError> {
        let handle = self.mint_handle(kind)?;
        self.ciphertexts.insert(handle, SealedValue { kind, value });
        Ok(handle)
    }
}

impl std::fmt::Debug for MockFheEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFheEngine")
            .field("ciphertexts", &self.ciphertexts.len())
            .field("acl_handles", &self.acl.len())
            .field("pending_inputs", &self.pending_inputs.len())
            .field("mint_counter", &self.mint_counter)
            .finish()
    }
}

fn check_range(value: u64, kind: FheScalarKind) -> Result<(), FheError> {
    if value > kind.max_value() {
        return Err(FheError::ValueOutOfRange { value, kind });
    }
    Ok(())
}

/// The digest an input proof must carry: canonical form of the
/// (contract, user, handles) triple the batch was encrypted under.
fn binding_digest(
    contract: ContractAddress,
    user: AccountAddress,
    handles: &[CiphertextHandle],
) -> Result<ContentDigest, FheError> {
    let canonical = CanonicalBytes::new(&serde_json::json!({
        "contract": contract,
        "handles": handles,
        "user": user,
    }))
    .map_err(|e| FheError::Canonicalization(e.to_string()))?;
    Ok(sha256_digest(&canonical))
}

impl FheCoprocessor for MockFheEngine {
    fn encrypt_input(
        &mut self,
        contract: ContractAddress,
        user: AccountAddress,
        values: &[(FheScalarKind, u64)],
    ) -> Result<EncryptedInput, FheError> {
        // Validate the whole batch before sealing anything.
        for &(kind, value) in values {
            check_range(value, kind)?;
        }
        let mut handles = Vec::with_capacity(values.len());
        for &(kind, value) in values {
            handles.push(self.seal(kind, value)?);
        }
        let digest = binding_digest(contract, user, &handles)?;
        for &handle in &handles {
            self.pending_inputs.insert(
                handle,
                InputBinding {
                    contract,
                    user,
                    digest,
                },
            );
        }
        Ok(EncryptedInput {
            handles,
            proof: InputProof::from_bytes(digest.as_bytes().to_vec()),
        })
    }

    fn verify_input(
        &mut self,
        handle: CiphertextHandle,
        proof: &InputProof,
        contract: ContractAddress,
        caller: AccountAddress,
    ) -> Result<(), FheError> {
        let binding = self
            .pending_inputs
            .get(&handle)
            .copied()
            .ok_or_else(|| FheError::ProofRejected {
                reason: format!(
                    "no pending binding for {handle}: already consumed or never registered"
                ),
            })?;
        if proof.as_bytes() != binding.digest.as_bytes() {
            return Err(FheError::ProofRejected {
                reason: "proof bytes do not match the recorded binding digest".to_string(),
            });
        }
        if binding.contract != contract {
            return Err(FheError::ProofRejected {
                reason: format!(
                    "input was encrypted for contract {}, not {contract}",
                    binding.contract
                ),
            });
        }
        if binding.user != caller {
            return Err(FheError::ProofRejected {
                reason: format!("input was encrypted by {}, not {caller}", binding.user),
            });
        }
        // Single-use: a verified binding cannot be replayed.
        self.pending_inputs.remove(&handle);
        Ok(())
    }

    fn trivial_encrypt(
        &mut self,
        value: u64,
        kind: FheScalarKind,
    ) -> Result<CiphertextHandle, FheError> {
        check_range(value, kind)?;
        self.seal(kind, value)
    }

    fn ge(
        &mut self,
        lhs: CiphertextHandle,
        rhs: CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError> {
        let left = self.resolve(lhs)?;
        let right = self.resolve(rhs)?;
        if left.kind != right.kind {
            return Err(FheError::KindMismatch {
                expected: left.kind,
                actual: right.kind,
            });
        }
        self.seal(FheScalarKind::Bool, u64::from(left.value >= right.value))
    }

    fn select(
        &mut self,
        cond: CiphertextHandle,
        then_value: CiphertextHandle,
        else_value: CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError> {
        let cond_sealed = self.resolve(cond)?;
        if cond_sealed.kind != FheScalarKind::Bool {
            return Err(FheError::KindMismatch {
                expected: FheScalarKind::Bool,
                actual: cond_sealed.kind,
            });
        }
        let then_sealed = self.resolve(then_value)?;
        let else_sealed = self.resolve(else_value)?;
        if then_sealed.kind != else_sealed.kind {
            return Err(FheError::KindMismatch {
                expected: then_sealed.kind,
                actual: else_sealed.kind,
            });
        }
        let chosen = if cond_sealed.value != 0 {
            then_sealed
        } else {
            else_sealed
        };
        self.seal(chosen.kind, chosen.value)
    }

    fn allow(
        &mut self,
        handle: CiphertextHandle,
        account: AccountAddress,
    ) -> Result<(), FheError> {
        if !self.ciphertexts.contains_key(&handle) {
            return Err(FheError::UnknownHandle { handle });
        }
        self.acl
            .entry(handle)
            .or_default()
            .insert(AclEntry::Account(account));
        Ok(())
    }

    fn allow_contract(
        &mut self,
        handle: CiphertextHandle,
        contract: ContractAddress,
    ) -> Result<(), FheError> {
        if !self.ciphertexts.contains_key(&handle) {
            return Err(FheError::UnknownHandle { handle });
        }
        self.acl
            .entry(handle)
            .or_default()
            .insert(AclEntry::Contract(contract));
        Ok(())
    }

    fn is_allowed(&self, handle: CiphertextHandle, account: AccountAddress) -> bool {
        self.acl
            .get(&handle)
            .is_some_and(|entries| entries.contains(&AclEntry::Account(account)))
    }

    fn user_decrypt(&self, request: &DecryptionRequest) -> Result<DecryptedValue, FheError> {
        request.verify().map_err(|e| FheError::BadSignature {
            reason: e.to_string(),
        })?;
        if !self.is_allowed(request.handle, request.requester) {
            return Err(FheError::AccessDenied {
                account: request.requester,
                handle: request.handle,
            });
        }
        let sealed = self.resolve(request.handle)?;
        Ok(DecryptedValue {
            kind: sealed.kind,
            value: sealed.value,
        })
    }
}
