//! # Ciphertext Handles and Input Proofs
//!
//! The opaque reference types the registry stores and passes through:
//! a `CiphertextHandle` names an encrypted value held by the coprocessor,
//! and an `InputProof` is the companion well-formedness proof supplied
//! with externally produced ciphertexts.
//!
//! ## Security Invariant
//!
//! Handles reveal nothing about the plaintext. The all-zero handle is
//! reserved as the "absent" sentinel returned by soft-failing reads; the
//! coprocessor never mints it for a live ciphertext.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Byte width of a ciphertext handle.
pub const HANDLE_LEN: usize = 32;

/// Opaque reference to an encrypted value held by the FHE coprocessor.
///
/// Serializes as a `0x`-prefixed hex string for JSON interoperability
/// and map-key use.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CiphertextHandle(pub [u8; HANDLE_LEN]);

/// The scalar kind sealed behind a handle. Homomorphic operations are
/// kind-checked: comparing a `euint8` against a `euint32` is a defect in
/// the calling contract, not a silent coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FheScalarKind {
    /// Encrypted boolean, the result kind of homomorphic comparisons.
    #[serde(rename = "ebool")]
    Bool,
    /// Encrypted 8-bit scalar (risk levels, statuses).
    #[serde(rename = "euint8")]
    U8,
    /// Encrypted 32-bit scalar (violation codes).
    #[serde(rename = "euint32")]
    U32,
}

/// Opaque proof byte-string accompanying externally produced ciphertexts.
///
/// The registry never inspects it; it is passed through to the
/// coprocessor's verifier unmodified.
#[derive(Clone, PartialEq, Eq)]
pub struct InputProof(Vec<u8>);

// ---------------------------------------------------------------------------
// CiphertextHandle impls
// ---------------------------------------------------------------------------

impl CiphertextHandle {
    /// The reserved "absent" sentinel. Soft-failing reads return this for
    /// records that do not exist.
    pub const ZERO: Self = Self([0u8; HANDLE_LEN]);

    /// Create a handle from raw bytes.
    pub fn from_bytes(bytes: [u8; HANDLE_LEN]) -> Self {
        Self(bytes)
    }

    /// True if this is the reserved absent sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HANDLE_LEN]
    }

    /// Return the raw handle bytes.
    pub fn as_bytes(&self) -> &[u8; HANDLE_LEN] {
        &self.0
    }

    /// Render as a `0x`-prefixed lowercase hex string.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(2 + HANDLE_LEN * 2);
        s.push_str("0x");
        for b in &self.0 {
            s.push_str(&format!("{b:02x}"));
        }
        s
    }

    /// Parse the `0x`-prefixed hex form produced by `to_hex`.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| format!("handle must start with 0x: {s:?}"))?;
        if body.len() != HANDLE_LEN * 2 {
            return Err(format!(
                "handle must be {} hex chars after 0x, got {}",
                HANDLE_LEN * 2,
                body.len()
            ));
        }
        let bytes = hex_to_bytes(body)?;
        let mut arr = [0u8; HANDLE_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CiphertextHandle(0x{}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// FheScalarKind impls
// ---------------------------------------------------------------------------

impl FheScalarKind {
    /// The largest plaintext value representable in this kind.
    pub fn max_value(&self) -> u64 {
        match self {
            Self::Bool => 1,
            Self::U8 => u8::MAX as u64,
            Self::U32 => u32::MAX as u64,
        }
    }

    /// The external type name, matching the handle type vocabulary on the
    /// client side.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "ebool",
            Self::U8 => "euint8",
            Self::U32 => "euint32",
        }
    }
}

impl std::fmt::Display for FheScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InputProof impls
// ---------------------------------------------------------------------------

impl InputProof {
    /// Wrap raw proof bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Access the raw proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Proof length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the proof carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        hex_to_bytes(s).map(Self)
    }
}

impl std::fmt::Debug for InputProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InputProof({} bytes, {}...)", self.0.len(), hex_prefix(&self.0))
    }
}

impl Serialize for InputProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for InputProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Hex utilities (no external hex crate dependency)
// ---------------------------------------------------------------------------

pub(crate) fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sentinel() {
        assert!(CiphertextHandle::ZERO.is_zero());
        assert!(!CiphertextHandle([1u8; HANDLE_LEN]).is_zero());
    }

    #[test]
    fn test_handle_hex_roundtrip() {
        let handle = CiphertextHandle([0xab; HANDLE_LEN]);
        let hex = handle.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + HANDLE_LEN * 2);
        assert_eq!(CiphertextHandle::from_hex(&hex).unwrap(), handle);
    }

    #[test]
    fn test_handle_from_hex_rejects_malformed() {
        assert!(CiphertextHandle::from_hex("abcd").is_err());
        assert!(CiphertextHandle::from_hex("0xabcd").is_err());
        assert!(CiphertextHandle::from_hex(&format!("0x{}", "zz".repeat(32))).is_err());
    }

    #[test]
    fn test_handle_serde_roundtrip() {
        let handle = CiphertextHandle([0x42; HANDLE_LEN]);
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, format!("\"{}\"", handle.to_hex()));
        let back: CiphertextHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, handle);
    }

    #[test]
    fn test_handle_debug_shows_prefix_only() {
        let handle = CiphertextHandle([0xcd; HANDLE_LEN]);
        let debug = format!("{handle:?}");
        assert!(debug.starts_with("CiphertextHandle(0xcdcdcdcd"));
        assert!(debug.ends_with("...)"));
    }

    #[test]
    fn test_kind_max_values() {
        assert_eq!(FheScalarKind::Bool.max_value(), 1);
        assert_eq!(FheScalarKind::U8.max_value(), 255);
        assert_eq!(FheScalarKind::U32.max_value(), u32::MAX as u64);
    }

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&FheScalarKind::Bool).unwrap(),
            "\"ebool\""
        );
        assert_eq!(
            serde_json::to_string(&FheScalarKind::U8).unwrap(),
            "\"euint8\""
        );
        assert_eq!(
            serde_json::to_string(&FheScalarKind::U32).unwrap(),
            "\"euint32\""
        );
        for kind in [FheScalarKind::Bool, FheScalarKind::U8, FheScalarKind::U32] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_proof_hex_roundtrip() {
        let proof = InputProof::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let hex = proof.to_hex();
        assert_eq!(hex, "deadbeef");
        assert_eq!(InputProof::from_hex(&hex).unwrap(), proof);
    }

    #[test]
    fn test_proof_debug_redacts_body() {
        let proof = InputProof::from_bytes(vec![0x01; 32]);
        let debug = format!("{proof:?}");
        assert!(debug.starts_with("InputProof(32 bytes, 01010101"));
    }

    #[test]
    fn test_proof_serde_roundtrip() {
        let proof = InputProof::from_bytes(vec![0xaa; 32]);
        let json = serde_json::to_string(&proof).unwrap();
        let back: InputProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
    }
}
