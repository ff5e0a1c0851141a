//! # Compliance Vocabulary — Single Source of Truth
//!
//! Defines the plaintext meaning of the registry's encrypted scalars:
//! `RiskLevel`, `ComplianceStatus`, and `ViolationCode`. These are the ONE
//! definition used across the stack. Every `match` on them must be
//! exhaustive — adding a variant forces every consumer to handle it at
//! compile time.
//!
//! The registry itself never observes these values in plaintext; they exist
//! on the client side of the encryption boundary (form input, decrypted
//! display) and in tests as the oracle for homomorphic results. The numeric
//! codes are the wire values that get encrypted.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Risk classification assigned by the submitter at record creation.
///
/// The numeric code is what gets encrypted into the record's risk-level
/// ciphertext. Ordering is meaningful: the creation path compares the
/// encrypted code against [`FLAG_RISK_THRESHOLD`] homomorphically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Routine finding, no elevated concern.
    Low,
    /// Worth review but below the flagging boundary.
    Medium,
    /// Elevated risk; auto-flagged at creation.
    High,
    /// Severe risk; auto-flagged at creation.
    Critical,
}

/// Review status of a compliance record.
///
/// The numeric code is what gets encrypted into the record's status
/// ciphertext. The initial value is derived homomorphically from the risk
/// level; later values are whatever the submitter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Awaiting review.
    Pending,
    /// Reviewed and cleared.
    Approved,
    /// Flagged for investigation.
    Flagged,
}

/// Free-form numeric violation code (e.g. an internal rulebook number).
/// Encrypted as a 32-bit scalar; the registry never sees the plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViolationCode(pub u32);

/// Number of risk levels. Used for exhaustiveness assertions.
pub const RISK_LEVEL_COUNT: usize = 4;

/// Number of compliance statuses. Used for exhaustiveness assertions.
pub const COMPLIANCE_STATUS_COUNT: usize = 3;

/// The creation-time flagging boundary: records with a risk level at or
/// above this start `Flagged`, all others start `Pending`.
pub const FLAG_RISK_THRESHOLD: RiskLevel = RiskLevel::High;

impl RiskLevel {
    /// Returns all risk levels in ascending severity order.
    pub fn all() -> &'static [RiskLevel] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    /// The numeric wire code that gets encrypted.
    pub fn code(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    /// Inverse of [`RiskLevel::code()`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            3 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Returns the snake_case string identifier for this level.
    /// Matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl ComplianceStatus {
    /// Returns all statuses in wire-code order.
    pub fn all() -> &'static [ComplianceStatus] {
        &[Self::Pending, Self::Approved, Self::Flagged]
    }

    /// The numeric wire code that gets encrypted.
    pub fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Flagged => 2,
        }
    }

    /// Inverse of [`ComplianceStatus::code()`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Flagged),
            _ => None,
        }
    }

    /// The status a freshly created record carries, as a plaintext oracle
    /// for the homomorphic derivation: `Flagged` at or above
    /// [`FLAG_RISK_THRESHOLD`], `Pending` below it.
    pub fn initial_for_risk(risk: RiskLevel) -> Self {
        if risk >= FLAG_RISK_THRESHOLD {
            Self::Flagged
        } else {
            Self::Pending
        }
    }

    /// Returns the snake_case string identifier for this status.
    /// Matches the serde serialization format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Flagged => "flagged",
        }
    }
}

impl ViolationCode {
    /// Access the inner code.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    /// Parse a risk level from its snake_case identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(CoreError::UnknownDomainValue(format!(
                "risk level {other:?}"
            ))),
        }
    }
}

impl FromStr for ComplianceStatus {
    type Err = CoreError;

    /// Parse a status from its snake_case identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "flagged" => Ok(Self::Flagged),
            other => Err(CoreError::UnknownDomainValue(format!("status {other:?}"))),
        }
    }
}
