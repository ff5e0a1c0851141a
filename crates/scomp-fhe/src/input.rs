//! # Encrypted Input Packaging
//!
//! Client-side construction of encrypted inputs: a batch of values is
//! encrypted in one pass, producing fresh handles plus a single input
//! proof binding every handle to the (contract, user) pair that made it.
//!
//! Registry operations take a handle and its proof separately, so a
//! caller encrypts first, then submits the pieces with the transaction.

use scomp_core::{AccountAddress, ContractAddress};
use serde::{Deserialize, Serialize};

use crate::coprocessor::{FheCoprocessor, FheError};
use crate::handle::{CiphertextHandle, FheScalarKind, InputProof};

/// The result of encrypting a batch of input values.
///
/// `handles[i]` is the ciphertext handle for the i-th value added to the
/// builder. All handles share the one `proof`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedInput {
    /// One handle per input value, in insertion order.
    pub handles: Vec<CiphertextHandle>,
    /// Proof binding every handle to the encrypting (contract, user) pair.
    pub proof: InputProof,
}

impl EncryptedInput {
    /// The handle at position `index`, if the batch is that large.
    pub fn handle(&self, index: usize) -> Option<CiphertextHandle> {
        self.handles.get(index).copied()
    }
}

/// Builder for a batch of encrypted inputs bound to one (contract, user)
/// pair.
///
/// ```ignore
/// let input = EncryptedInputBuilder::new(registry_address, submitter)
///     .add_u8(risk_level.code())
///     .add_u32(violation_code.as_u32())
///     .encrypt(&mut engine)?;
/// ```
#[derive(Debug, Clone)]
pub struct EncryptedInputBuilder {
    contract: ContractAddress,
    user: AccountAddress,
    values: Vec<(FheScalarKind, u64)>,
}

impl EncryptedInputBuilder {
    /// Start a batch bound to `contract` and `user`.
    pub fn new(contract: ContractAddress, user: AccountAddress) -> Self {
        Self {
            contract,
            user,
            values: Vec::new(),
        }
    }

    /// Append a boolean value.
    pub fn add_bool(mut self, value: bool) -> Self {
        self.values.push((FheScalarKind::Bool, u64::from(value)));
        self
    }

    /// Append an 8-bit value.
    pub fn add_u8(mut self, value: u8) -> Self {
        self.values.push((FheScalarKind::U8, u64::from(value)));
        self
    }

    /// Append a 32-bit value.
    pub fn add_u32(mut self, value: u32) -> Self {
        self.values.push((FheScalarKind::U32, u64::from(value)));
        self
    }

    /// Number of values queued so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no values have been added.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encrypt the batch through `engine`, consuming the builder.
    pub fn encrypt<F: FheCoprocessor + ?Sized>(
        self,
        engine: &mut F,
    ) -> Result<EncryptedInput, FheError> {
        engine.encrypt_input(self.contract, self.user, &self.values)
    }
}
