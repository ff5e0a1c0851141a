//! # Account Keys and Decryption Requests
//!
//! Ed25519 key material for ledger accounts and the signed capability
//! artifact that authorizes releasing a plaintext: the decryption request.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes.
//!   This enforces that all signed data has been canonicalized through the
//!   JCS pipeline, preventing the canonicalization split defect.
//! - Private keys are never serialized or logged. `AccountKeys` does not
//!   implement `Serialize` or expose the signing key bytes.
//! - A decryption request is self-authenticating: it carries the public
//!   key, and verifiers recompute the requester address from that key, so
//!   a request cannot claim an address its key does not own.
//!
//! ## Serde
//!
//! - Public keys serialize/deserialize as hex-encoded strings.
//! - Signatures serialize/deserialize as hex-encoded strings.

use ed25519_dalek::{Signer, Verifier};
use scomp_core::{AccountAddress, CanonicalBytes};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::handle::{hex_prefix, hex_to_bytes, CiphertextHandle};

/// Errors from key parsing and signature verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key bytes or hex were malformed.
    #[error("key error: {0}")]
    Malformed(String),

    /// A signature did not verify over the given canonical bytes.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// The request's claimed address is not derived from its public key.
    #[error("requester address {claimed} does not match public key address {derived}")]
    AddressMismatch {
        /// The address the request claims.
        claimed: AccountAddress,
        /// The address derived from the request's public key.
        derived: AccountAddress,
    },
}

/// An Ed25519 public key (32 bytes) for signature verification.
///
/// Serializes as a hex-encoded string for JSON interoperability.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
///
/// Produced only from `CanonicalBytes` input. Serializes as a hex-encoded
/// string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair bound to a ledger account.
///
/// Does not implement `Serialize` — private keys must not be accidentally
/// serialized into logs, state files, or receipts.
pub struct AccountKeys {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The ledger address derived from this key.
    pub fn address(&self) -> AccountAddress {
        AccountAddress::from_public_key_bytes(&self.0)
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(KeyError::Malformed(format!(
                "public key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(KeyError::Malformed)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey` for verification operations.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, KeyError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| KeyError::Malformed(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 128 {
            return Err(KeyError::VerificationFailed(format!(
                "signature hex must be 128 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(KeyError::VerificationFailed)?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// AccountKeys impls
// ---------------------------------------------------------------------------

impl AccountKeys {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte seed.
    ///
    /// Deterministic: the same seed always yields the same keys and
    /// address. Dev keystores persist seeds; production keys never should.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key from this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        let vk = self.signing_key.verifying_key();
        Ed25519PublicKey(vk.to_bytes())
    }

    /// The ledger address this key pair controls.
    pub fn address(&self) -> AccountAddress {
        self.public_key().address()
    }

    /// Sign canonical bytes.
    ///
    /// The signing input MUST be `&CanonicalBytes` to enforce that all
    /// signed data has been canonicalized through the JCS pipeline.
    ///
    /// # Security Invariant
    ///
    /// You cannot sign raw `&[u8]` — this prevents signing non-canonical
    /// data which would cause verification failures across implementations.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        let sig = self.signing_key.sign(data.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }
}

impl std::fmt::Debug for AccountKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountKeys(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over canonical bytes.
///
/// # Security Invariant
///
/// The message parameter is `&CanonicalBytes`, enforcing at compile time
/// that only canonicalized data can be verified. This prevents the
/// canonicalization split defect by construction.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    verifying_key: &ed25519_dalek::VerifyingKey,
) -> Result<(), KeyError> {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(data.as_bytes(), &sig)
        .map_err(|e| KeyError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

/// Convenience verification using `Ed25519PublicKey` instead of a dalek key.
pub fn verify_with_public_key(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), KeyError> {
    let vk = public_key.to_verifying_key()?;
    verify(data, signature, &vk)
}

// ---------------------------------------------------------------------------
// DecryptionRequest
// ---------------------------------------------------------------------------

/// A signed request to release the plaintext behind a handle.
///
/// The "decryption capability" artifact: the coprocessor releases a
/// plaintext only to a request whose signature verifies under the carried
/// public key, whose requester address is derived from that key, and
/// whose requester holds an ACL entry for the handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecryptionRequest {
    /// The handle whose plaintext is requested.
    pub handle: CiphertextHandle,
    /// The account requesting decryption.
    pub requester: AccountAddress,
    /// The requester's public key; the verifier re-derives the address
    /// from it.
    pub public_key: Ed25519PublicKey,
    /// Ed25519 signature over the canonical form of (handle, requester).
    pub signature: Ed25519Signature,
}

impl DecryptionRequest {
    /// Build and sign a request for `handle` on behalf of `keys`.
    pub fn sign(keys: &AccountKeys, handle: CiphertextHandle) -> Result<Self, KeyError> {
        let requester = keys.address();
        let payload = Self::signing_payload(handle, requester)?;
        let signature = keys.sign(&payload);
        Ok(Self {
            handle,
            requester,
            public_key: keys.public_key(),
            signature,
        })
    }

    /// The canonical bytes a request signs: `{handle, requester}`.
    pub fn signing_payload(
        handle: CiphertextHandle,
        requester: AccountAddress,
    ) -> Result<CanonicalBytes, KeyError> {
        CanonicalBytes::new(&serde_json::json!({
            "handle": handle,
            "requester": requester,
        }))
        .map_err(|e| KeyError::Malformed(format!("canonicalization failed: {e}")))
    }

    /// Verify the request's internal consistency: the address derivation
    /// and the capability signature. ACL checking is the coprocessor's
    /// job, not the request's.
    pub fn verify(&self) -> Result<(), KeyError> {
        let derived = self.public_key.address();
        if derived != self.requester {
            return Err(KeyError::AddressMismatch {
                claimed: self.requester,
                derived,
            });
        }
        let payload = Self::signing_payload(self.handle, self.requester)?;
        verify_with_public_key(&payload, &self.signature, &self.public_key)
    }
}
