//! # scomp-registry — Confidential Compliance Registry
//!
//! The registry state machine: an append-mostly store of encrypted
//! compliance records with submitter-gated mutation and explicit
//! per-user decryption grants.
//!
//! ## Modules
//!
//! - **Registry** (`registry.rs`): the `ComplianceRegistry` owning all
//!   mutable state (`count`, `records`, `access_grants`, event log) and
//!   the three entry points `create_record`, `update_status`,
//!   `grant_access`.
//!
//! - **Record** (`record.rs`): the stored `Record` and the soft-fail
//!   `RecordInfo` projection returned for any id.
//!
//! - **Event** (`event.rs`): the append-only `RegistryEvent` log, filterable
//!   by record id and submitter.
//!
//! ## Design
//!
//! The registry is generic over [`scomp_fhe::FheCoprocessor`] and never
//! observes plaintext: the initial status is derived from the encrypted
//! risk level with a homomorphic `>=` and select, and every stored handle
//! is ACL-sealed for the contract and the submitter. State is a single
//! explicit struct mutated only through the entry points — no ambient
//! globals, so a surrounding ledger can snapshot and roll back the whole
//! registry by value.

pub mod event;
pub mod record;
pub mod registry;

// ─── Registry re-exports ────────────────────────────────────────────

pub use registry::{CallContext, ComplianceRegistry, RegistryError};

// ─── Record re-exports ──────────────────────────────────────────────

pub use record::{Record, RecordInfo};

// ─── Event re-exports ───────────────────────────────────────────────

pub use event::RegistryEvent;
