//! # Content Digest — SHA-256 over Canonical Bytes
//!
//! Defines `ContentDigest`, the digest type used for transaction hashes
//! and input-proof binding commitments.
//!
//! ## Security Invariant
//!
//! `ContentDigest` can only be computed from `CanonicalBytes`, ensuring
//! that every digest in the system is produced through the correct
//! canonicalization pipeline. This is enforced by the signature of
//! `sha256_digest()`: it does not accept raw `&[u8]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 content digest.
///
/// Produced exclusively from `CanonicalBytes` via [`sha256_digest()`].
/// Displays and serializes as `sha256:<64 lowercase hex chars>` so a
/// digest is self-describing wherever it lands in logs or state files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Render the digest body as a lowercase hex string (no prefix).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse the `sha256:<hex>` form produced by `Display`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let body = s
            .strip_prefix("sha256:")
            .ok_or_else(|| format!("digest must start with sha256: — got {s:?}"))?;
        if body.len() != 64 {
            return Err(format!("digest body must be 64 hex chars, got {}", body.len()));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in body.as_bytes().chunks(2).enumerate() {
            let hi = (chunk[0] as char)
                .to_digit(16)
                .ok_or_else(|| format!("invalid hex char in digest: {:?}", chunk[0] as char))?;
            let lo = (chunk[1] as char)
                .to_digit(16)
                .ok_or_else(|| format!("invalid hex char in digest: {:?}", chunk[1] as char))?;
            bytes[i] = ((hi << 4) | lo) as u8;
        }
        Ok(Self(bytes))
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// # Security Invariant
///
/// Accepts only `&CanonicalBytes`, not raw `&[u8]`. This compile-time
/// constraint prevents any code path from computing a digest over
/// non-canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
///
/// Convenience wrapper around [`sha256_digest()`] for contexts that need
/// the bare hex body (e.g. proof byte-strings).
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}
