//! # FHE Coprocessor Trait — the Capability Seam
//!
//! The registry depends on this trait, never on a concrete engine. A
//! production deployment would implement it over a hosted FHE service;
//! the workspace ships [`crate::mock::MockFheEngine`], a deterministic
//! in-process implementation, so every registry behavior can be executed
//! and tested end-to-end.
//!
//! ## Trust Boundary
//!
//! Everything behind this trait is delegated: proof verification, the
//! ciphertext store, the access-control list, and decryption-signature
//! checking. The registry's only obligations on its side of the seam are
//! to pass handles and proofs through unmodified and to gate calls by
//! caller identity.

use scomp_core::{AccountAddress, ContractAddress};
use thiserror::Error;

use crate::handle::{CiphertextHandle, FheScalarKind, InputProof};
use crate::input::EncryptedInput;
use crate::keys::DecryptionRequest;

/// Failures surfaced by the coprocessor capability.
///
/// Every variant aborts the enclosing transaction; the registry performs
/// no partial application on any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FheError {
    /// An input proof failed verification: forged bytes, wrong binding
    /// target, or a binding that was already consumed.
    #[error("input proof rejected: {reason}")]
    ProofRejected {
        /// Why the verifier refused the proof.
        reason: String,
    },

    /// A handle names no ciphertext known to the coprocessor.
    #[error("unknown ciphertext handle: {handle}")]
    UnknownHandle {
        /// The handle that failed to resolve.
        handle: CiphertextHandle,
    },

    /// A homomorphic operand had the wrong scalar kind.
    #[error("ciphertext kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        /// The kind the operation requires.
        expected: FheScalarKind,
        /// The kind actually sealed behind the handle.
        actual: FheScalarKind,
    },

    /// A plaintext does not fit the requested scalar kind.
    #[error("value {value} out of range for {kind}")]
    ValueOutOfRange {
        /// The offending plaintext.
        value: u64,
        /// The kind it was supposed to fit.
        kind: FheScalarKind,
    },

    /// The requester holds no ACL entry for the handle.
    #[error("account {account} is not allowed to decrypt {handle}")]
    AccessDenied {
        /// The account that requested decryption.
        account: AccountAddress,
        /// The handle it was denied for.
        handle: CiphertextHandle,
    },

    /// The decryption request's capability signature did not verify.
    #[error("decryption request rejected: {reason}")]
    BadSignature {
        /// Why the signature check failed.
        reason: String,
    },

    /// Canonicalization of capability-internal material failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(String),
}

/// A decrypted plaintext together with its scalar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptedValue {
    /// The scalar kind that was sealed behind the handle.
    pub kind: FheScalarKind,
    /// The plaintext value, widened to u64.
    pub value: u64,
}

impl DecryptedValue {
    /// The value as a u8, for `euint8` fields.
    pub fn as_u8(&self) -> u8 {
        self.value as u8
    }

    /// The value as a u32, for `euint32` fields.
    pub fn as_u32(&self) -> u32 {
        self.value as u32
    }
}

/// The FHE capability surface the registry and its clients program
/// against.
///
/// Write-side methods take `&mut self`: the capability records pending
/// input bindings, mints result handles, and maintains the ACL. Read-side
/// methods (`is_allowed`, `user_decrypt`) take `&self`.
pub trait FheCoprocessor: Send + Sync {
    /// Client-side encryption: seal `values` into fresh ciphertexts bound
    /// to `(contract, user)`, returning the handles plus one proof
    /// covering all of them.
    ///
    /// Prefer building through [`crate::input::EncryptedInputBuilder`],
    /// which mirrors the client SDK flow.
    fn encrypt_input(
        &mut self,
        contract: ContractAddress,
        user: AccountAddress,
        values: &[(FheScalarKind, u64)],
    ) -> Result<EncryptedInput, FheError>;

    /// Accept an externally produced ciphertext into contract scope.
    ///
    /// Rejects proofs whose binding does not name exactly this
    /// `(contract, caller)` pair, proofs whose bytes do not match the
    /// recorded binding commitment, and handles whose binding was already
    /// consumed. On success the binding is retired: input proofs are
    /// single-use.
    fn verify_input(
        &mut self,
        handle: CiphertextHandle,
        proof: &InputProof,
        contract: ContractAddress,
        caller: AccountAddress,
    ) -> Result<(), FheError>;

    /// Encrypt a public constant. Used for homomorphic comparisons
    /// against known boundaries and for constant select arms.
    fn trivial_encrypt(
        &mut self,
        value: u64,
        kind: FheScalarKind,
    ) -> Result<CiphertextHandle, FheError>;

    /// Homomorphic `lhs >= rhs`. Operand kinds must match; the result is
    /// an `ebool` handle.
    fn ge(
        &mut self,
        lhs: CiphertextHandle,
        rhs: CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError>;

    /// Homomorphic conditional select: the encrypted equivalent of
    /// `if cond { then_value } else { else_value }`. `cond` must be an
    /// `ebool`; the arms must share a kind, which the result inherits.
    fn select(
        &mut self,
        cond: CiphertextHandle,
        then_value: CiphertextHandle,
        else_value: CiphertextHandle,
    ) -> Result<CiphertextHandle, FheError>;

    /// Grant an account standing decryption access to a handle.
    /// Idempotent.
    fn allow(
        &mut self,
        handle: CiphertextHandle,
        account: AccountAddress,
    ) -> Result<(), FheError>;

    /// Grant a contract compute access to a handle (the contract-side
    /// half of the ACL). Idempotent.
    fn allow_contract(
        &mut self,
        handle: CiphertextHandle,
        contract: ContractAddress,
    ) -> Result<(), FheError>;

    /// True if `account` holds an ACL entry for `handle`.
    fn is_allowed(&self, handle: CiphertextHandle, account: AccountAddress) -> bool;

    /// Release the plaintext behind a handle to an authorized requester.
    ///
    /// Verifies the request's ed25519 capability signature, checks that
    /// the requester address is derived from the signing key, and checks
    /// the ACL. The plaintext is released only if all three hold.
    fn user_decrypt(&self, request: &DecryptionRequest) -> Result<DecryptedValue, FheError>;
}
