//! # scomp-runtime — Local Transaction Harness
//!
//! Executes registry operations under the atomic, serial transaction
//! model the registry assumes. [`LocalLedger`] owns a
//! [`scomp_registry::ComplianceRegistry`] and a
//! [`scomp_fhe::MockFheEngine`], snapshots both before every submission,
//! and restores them wholesale when an operation fails. Committed calls
//! return a [`TxReceipt`] carrying the block number, a canonical
//! transaction hash, the typed output, and exactly the events the call
//! emitted.
//!
//! The whole ledger serializes to JSON, which is how the CLI persists
//! chain state between invocations.

pub mod ledger;
pub mod receipt;

pub use ledger::{LedgerError, LocalLedger, DEFAULT_BLOCK_INTERVAL_SECS};
pub use receipt::TxReceipt;
