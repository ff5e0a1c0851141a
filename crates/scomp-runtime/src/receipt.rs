//! # Transaction Receipts
//!
//! What a caller gets back from a committed transaction: the block it
//! landed in, a content hash of the submitted call, the operation's
//! output, and exactly the events that call emitted.

use serde::{Deserialize, Serialize};

use scomp_core::ContentDigest;
use scomp_registry::RegistryEvent;

/// Receipt for one committed transaction.
///
/// Failed submissions produce no receipt — the ledger returns the error
/// and restores pre-transaction state instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxReceipt<T> {
    /// The block this transaction was committed in.
    pub block_number: u64,
    /// SHA-256 over the canonical transaction description.
    pub tx_hash: ContentDigest,
    /// The operation's return value.
    pub output: T,
    /// Events emitted by this transaction alone, in emission order.
    pub events: Vec<RegistryEvent>,
}

impl<T> TxReceipt<T> {
    /// Replace the output, keeping block, hash, and events. Used when a
    /// caller wants to discard or project the typed output.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TxReceipt<U> {
        TxReceipt {
            block_number: self.block_number,
            tx_hash: self.tx_hash,
            output: f(self.output),
            events: self.events,
        }
    }
}
