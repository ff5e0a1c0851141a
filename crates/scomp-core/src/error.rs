//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the Secure Compliance Stack. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Parse errors name the offending input and the expected shape.
//! - Canonicalization errors fail loudly: a value that cannot be
//!   canonicalized must never be silently digested or signed.
//! - Crate-specific taxonomies (capability failures, registry rejections)
//!   live in their own crates and wrap these where needed.

use thiserror::Error;

/// Top-level error type for the core vocabulary crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An address string failed to parse.
    #[error("address error: {0}")]
    Address(#[from] AddressParseError),

    /// A timestamp string failed to parse.
    #[error("timestamp error: {0}")]
    Timestamp(String),

    /// A domain enum label was not recognized.
    #[error("unknown domain value: {0}")]
    UnknownDomainValue(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Scalar values must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error parsing a hex-encoded account or contract address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Missing the mandatory `0x` prefix.
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),

    /// Wrong number of hex characters after the prefix.
    #[error("address must be {expected} hex chars after 0x, got {actual}")]
    WrongLength {
        /// Expected number of hex characters.
        expected: usize,
        /// Actual number of hex characters supplied.
        actual: usize,
    },

    /// A character outside `[0-9a-fA-F]` appeared in the hex body.
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidHexChar {
        /// The offending character.
        character: char,
        /// Zero-based position within the hex body.
        position: usize,
    },
}
