//! # scomp-cli — Command-Line Interface for the Compliance Registry
//!
//! Provides the `scomp` binary: a local ledger with named signing
//! accounts, encrypted record submission, and authorized decryption.
//! All state lives in one JSON file (`scomp-state.json` by default),
//! so a full workflow can be driven from a shell:
//!
//! ```bash
//! scomp init
//! scomp account new --name auditor
//! scomp record create --submitter auditor --risk high --violation-code 4101
//! scomp record grant-access --submitter auditor --id 0 --user reviewer
//! scomp record decrypt --account reviewer --id 0 --field status
//! ```
//!
//! Handler functions return process exit codes and print human-readable
//! lines; the domain crates do the actual work. Plaintext values exist
//! only on the client side of each command — the ledger stores handles.

pub mod account;
pub mod record;
pub mod store;
