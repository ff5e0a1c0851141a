//! # scomp-fhe
//!
//! FHE coprocessor seam for the Secure Compliance Stack: ciphertext
//! handles, input proofs, account keys, decryption requests, and the
//! [`FheCoprocessor`] trait the registry programs against.
//!
//! The registry never sees plaintext. It manipulates 32-byte handles and
//! asks the coprocessor for the three homomorphic operations it needs:
//! trivial encryption of public constants, `>=` comparison, and
//! conditional select. Decryption happens off the write path, gated by
//! per-handle ACLs and signed [`DecryptionRequest`] capabilities.
//!
//! [`MockFheEngine`] is the deterministic in-memory implementation used
//! by the local ledger and the test suites. A production deployment
//! would swap in a networked coprocessor behind the same trait.
//!
//! ## Key Design Principles
//!
//! 1. **Handles are opaque**: nothing about a plaintext is recoverable
//!    from its handle, and fresh handles are minted for every operation
//!    result, including re-encryptions of equal values.
//! 2. **Proofs bind, then expire**: an input proof ties handles to one
//!    (contract, user) pair and is consumed by verification, so a
//!    ciphertext cannot be replayed into a second transaction.
//! 3. **Decryption is a signed capability**: plaintext release requires
//!    an Ed25519 signature over canonical bytes plus a standing ACL
//!    entry.
//! 4. **No plaintext in logs**: sealed values and private keys are
//!    excluded from every `Debug` impl in this crate.

pub mod coprocessor;
pub mod handle;
pub mod input;
pub mod keys;
pub mod mock;

pub use coprocessor::{DecryptedValue, FheCoprocessor, FheError};
pub use handle::{CiphertextHandle, FheScalarKind, InputProof, HANDLE_LEN};
pub use input::{EncryptedInput, EncryptedInputBuilder};
pub use keys::{
    verify, verify_with_public_key, AccountKeys, DecryptionRequest, Ed25519PublicKey,
    Ed25519Signature, KeyError,
};
pub use mock::MockFheEngine;
