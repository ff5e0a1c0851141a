//! # Registry Notifications
//!
//! The append-only event log the registry emits for external consumers.
//! Creation is the only notifying operation: status updates and grants
//! change state silently, so consumers poll reads for those.

use serde::{Deserialize, Serialize};

use scomp_core::{AccountAddress, RecordId, Timestamp};

/// An externally observable registry event.
///
/// Events are indexed by record id and submitter so consumers can filter
/// without replaying the whole log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A record was created and assigned `record_id`.
    RecordCreated {
        /// The freshly allocated id.
        record_id: RecordId,
        /// Who created the record.
        submitter: AccountAddress,
        /// Block time of the creating transaction.
        timestamp: Timestamp,
    },
}

impl RegistryEvent {
    /// The record this event concerns.
    pub fn record_id(&self) -> RecordId {
        match self {
            Self::RecordCreated { record_id, .. } => *record_id,
        }
    }

    /// The account that triggered this event.
    pub fn submitter(&self) -> AccountAddress {
        match self {
            Self::RecordCreated { submitter, .. } => *submitter,
        }
    }

    /// Block time the event was emitted at.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::RecordCreated { timestamp, .. } => *timestamp,
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordCreated {
                record_id,
                submitter,
                timestamp,
            } => write!(
                f,
                "RecordCreated({record_id}, submitter={submitter}, at={timestamp})"
            ),
        }
    }
}
