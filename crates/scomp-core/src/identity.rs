//! # Ledger Identity Newtypes
//!
//! Newtype wrappers for the identifiers that move through the registry:
//! account addresses, contract addresses, and record ids. These prevent
//! accidental identifier confusion — you cannot pass a `ContractAddress`
//! where an `AccountAddress` is expected, and a `RecordId` is not a bare
//! integer.
//!
//! ## Security Invariant
//!
//! Type-level distinction between identifier namespaces prevents
//! cross-namespace confusion where one kind of identifier is substituted
//! for another. Addresses serialize as `0x`-prefixed lowercase hex and
//! parse back through a validating constructor only.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::AddressParseError;

/// Byte width of ledger addresses.
pub const ADDRESS_LEN: usize = 20;

/// An externally owned account address: the authenticated transaction
/// sender identity the registry trusts.
///
/// Derived from an ed25519 public key by truncating its SHA-256 digest
/// to the trailing [`ADDRESS_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress(pub [u8; ADDRESS_LEN]);

/// The address a deployed registry instance lives at. Input proofs are
/// bound to this address, so ciphertexts encrypted for one registry
/// cannot be replayed into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractAddress(pub [u8; ADDRESS_LEN]);

/// Dense record identifier: assigned sequentially from zero, unique,
/// never reused. The set of live ids is always `0..count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl AccountAddress {
    /// The all-zero address, used as the "absent submitter" sentinel in
    /// soft-failing reads.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Derive an account address from raw ed25519 public key bytes.
    ///
    /// Takes the trailing [`ADDRESS_LEN`] bytes of the key's SHA-256
    /// digest, so an address commits to exactly one public key.
    pub fn from_public_key_bytes(public_key: &[u8; 32]) -> Self {
        Self(truncated_key_digest(public_key))
    }

    /// Parse a `0x`-prefixed hex address string.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        parse_hex_address(s).map(Self)
    }

    /// True if this is the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Access the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl ContractAddress {
    /// Parse a `0x`-prefixed hex address string.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        parse_hex_address(s).map(Self)
    }

    /// Derive a deterministic contract address from a deployment label,
    /// for local ledgers that have no real deployment transaction.
    pub fn from_label(label: &str) -> Self {
        Self(truncated_key_digest(label.as_bytes()))
    }

    /// Access the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl RecordId {
    /// Wrap a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Access the inner integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// SHA-256 the input and keep the trailing `ADDRESS_LEN` bytes.
fn truncated_key_digest(input: &[u8]) -> [u8; ADDRESS_LEN] {
    let digest = Sha256::digest(input);
    let mut out = [0u8; ADDRESS_LEN];
    out.copy_from_slice(&digest[32 - ADDRESS_LEN..]);
    out
}

fn parse_hex_address(s: &str) -> Result<[u8; ADDRESS_LEN], AddressParseError> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| AddressParseError::MissingPrefix(s.to_string()))?;
    if body.len() != ADDRESS_LEN * 2 {
        return Err(AddressParseError::WrongLength {
            expected: ADDRESS_LEN * 2,
            actual: body.len(),
        });
    }
    let mut bytes = [0u8; ADDRESS_LEN];
    for (i, chunk) in body.as_bytes().chunks(2).enumerate() {
        let hi = hex_nibble(chunk[0] as char, i * 2)?;
        let lo = hex_nibble(chunk[1] as char, i * 2 + 1)?;
        bytes[i] = (hi << 4) | lo;
    }
    Ok(bytes)
}

fn hex_nibble(c: char, position: usize) -> Result<u8, AddressParseError> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or(AddressParseError::InvalidHexChar {
            character: c,
            position,
        })
}

fn format_hex_address(bytes: &[u8; ADDRESS_LEN]) -> String {
    let mut s = String::with_capacity(2 + ADDRESS_LEN * 2);
    s.push_str("0x");
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

impl std::fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_hex_address(&self.0))
    }
}

impl std::fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_hex_address(&self.0))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record:{}", self.0)
    }
}

impl std::str::FromStr for AccountAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::str::FromStr for ContractAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hex_address(&self.0))
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ContractAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hex_address(&self.0))
    }
}

impl<'de> Deserialize<'de> for ContractAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
