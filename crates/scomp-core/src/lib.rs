//! # scomp-core — Foundational Types for the Secure Compliance Stack
//!
//! This crate is the bedrock of the Secure Compliance Stack. It defines the
//! core type-system primitives that enforce correctness guarantees at compile
//! time. Every other crate in the workspace depends on `scomp-core`; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for ledger primitives.** `AccountAddress`,
//!    `ContractAddress`, `RecordId` — all newtypes with validated
//!    constructors. No bare strings or integers for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** ALL digest and signature computation
//!    flows through `CanonicalBytes::new()`. No raw `serde_json::to_vec()`
//!    for digests. Ever. This prevents the canonicalization split defect
//!    class by construction.
//!
//! 3. **Single compliance vocabulary.** One definition each of `RiskLevel`,
//!    `ComplianceStatus`, and `ViolationCode`, with exhaustive `match`
//!    everywhere. Adding a variant forces every consumer to handle it.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision — matching the JCS canonicalization rules.
//!
//! 5. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that all digest paths flow through canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `scomp-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use domain::{
    ComplianceStatus, RiskLevel, ViolationCode, COMPLIANCE_STATUS_COUNT, FLAG_RISK_THRESHOLD,
    RISK_LEVEL_COUNT,
};
pub use error::{AddressParseError, CanonicalizationError, CoreError};
pub use identity::{AccountAddress, ContractAddress, RecordId, ADDRESS_LEN};
pub use temporal::Timestamp;
