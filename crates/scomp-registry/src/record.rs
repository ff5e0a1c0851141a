//! # Compliance Records
//!
//! The stored record and its soft-fail read projection. A record keeps
//! three ciphertext handles (risk level, status, violation code) plus
//! plaintext metadata (submitter, timestamp). Risk level and violation
//! code are write-once at creation; status is replaced wholesale by
//! `updateStatus`-style calls.

use serde::{Deserialize, Serialize};

use scomp_core::{AccountAddress, RecordId, Timestamp};
use scomp_fhe::CiphertextHandle;

/// A compliance record as stored in the registry.
///
/// The registry never holds plaintext risk, status, or violation data —
/// only opaque handles into the FHE coprocessor. Existence is encoded by
/// membership in the registry's record map, not by a flag on the struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Dense identifier, allocated sequentially from zero.
    pub id: RecordId,
    /// The account that created the record. Immutable; sole authority
    /// for status updates and access grants.
    pub submitter: AccountAddress,
    /// Block time at creation. Immutable.
    pub timestamp: Timestamp,
    /// Handle to the encrypted risk level (`euint8`). Write-once.
    pub encrypted_risk_level: CiphertextHandle,
    /// Handle to the encrypted compliance status (`euint8`). Mutable.
    pub encrypted_status: CiphertextHandle,
    /// Handle to the encrypted violation code (`euint32`). Write-once.
    pub encrypted_violation_code: CiphertextHandle,
}

/// Plaintext metadata view of a record, safe to return for any id.
///
/// Reads fail softly: asking about an unallocated id yields
/// `exists: false` with zeroed metadata rather than an error, so callers
/// must check `exists` before trusting the other fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordInfo {
    /// The id that was queried.
    pub id: RecordId,
    /// Submitter address, or the zero address if the record is missing.
    pub submitter: AccountAddress,
    /// Creation time, or the Unix epoch if the record is missing.
    pub timestamp: Timestamp,
    /// Whether the id names an allocated record.
    pub exists: bool,
}

impl RecordInfo {
    /// The projection of an allocated record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id,
            submitter: record.submitter,
            timestamp: record.timestamp,
            exists: true,
        }
    }

    /// The sentinel returned for an unallocated id.
    pub fn missing(id: RecordId) -> Self {
        Self {
            id,
            submitter: AccountAddress::ZERO,
            timestamp: Timestamp::unix_epoch(),
            exists: false,
        }
    }
}
