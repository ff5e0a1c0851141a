//! # Canonical Serialization — JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that get digested or signed anywhere in the stack: input-proof bindings,
//! decryption-request signatures, and transaction hashes all flow through it.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which applies the type
//! coercion pipeline (float rejection, key stringification) before JCS
//! serialization.
//!
//! This makes the "wrong serialization path" defect class structurally
//! impossible: any function requiring canonical bytes for digest computation
//! or signing must accept `&CanonicalBytes`, and the only way to produce one
//! is through the correct pipeline. A proof verifier and a proof producer
//! that both take this type cannot disagree about byte layout.
//!
//! ## Canonicalization Rules
//!
//! 1. **Reject floats** — scalar values in signed material must be strings
//!    or integers. Floats have non-deterministic JCS number serialization
//!    edge cases.
//! 2. **Coerce non-string keys** — all object keys become strings.
//! 3. **Tuples serialize as arrays.**
//!
//! After coercion, serialization uses `serde_jcs` for RFC 8785 (JSON
//! Canonicalization Scheme) compliant output: sorted keys, compact
//! separators, deterministic byte sequence.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - All numeric values are integers or strings, never floats.
/// - All object keys are strings.
/// - Serialization uses sorted keys with compact separators (RFC 8785).
///
/// These invariants are enforced by the constructor and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY way to construct `CanonicalBytes`. All digest and
    /// signature computation in the stack must flow through this constructor.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains
    /// float numbers. Returns `CanonicalizationError::SerializationFailed` if
    /// JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value)?;
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest or signature computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively coerce JSON values according to the canonicalization rules.
///
/// 1. `null`, `bool`, `string`, `integer` — pass through unchanged.
/// 2. `float` (non-integer) — **rejected** with `FloatRejected` error.
/// 3. `object` — keys coerced to strings (already strings in JSON), values recursed.
/// 4. `array` — elements recursed.
///
/// In the Rust/serde world, datetime and tuple coercion happen at the
/// serialization boundary (`Serialize` impl), not in the JSON value tree.
/// Chrono's `DateTime<Utc>` serializes to an ISO8601 string, and Rust tuples
/// serialize to JSON arrays. The `Timestamp` type in this crate ensures the
/// Z-suffix and second-precision invariants.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            // Reject pure floats (not representable as i64/u64).
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                // Keys are already strings in JSON (serde_json::Map<String, Value>).
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
///
/// Uses `serde_jcs` for deterministic output: sorted keys, compact
/// separators, no trailing whitespace, UTF-8 encoded.
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_bytes_simple_dict() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        // JCS: sorted keys, compact separators
        assert_eq!(s, r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_canonical_bytes_sorted_keys() {
        let data = serde_json::json!({"z": 1, "m": 2, "a": 3});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"a":3,"m":2,"z":1}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        // Nested objects also have sorted keys
        assert_eq!(s, r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_float_rejection() {
        let data = serde_json::json!({"amount": 1.5});
        let result = CanonicalBytes::new(&data);
        assert!(result.is_err());
        match result.unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 1.5),
            other => panic!("Expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn test_integer_accepted() {
        let data = serde_json::json!({"amount": 42});
        let cb = CanonicalBytes::new(&data).expect("integers should be accepted");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"amount":42}"#);
    }

    #[test]
    fn test_null_passthrough() {
        let data = serde_json::json!({"key": null});
        let cb = CanonicalBytes::new(&data).expect("null should pass through");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"key":null}"#);
    }

    #[test]
    fn test_bool_passthrough() {
        let data = serde_json::json!({"flag": true, "other": false});
        let cb = CanonicalBytes::new(&data).expect("bools should pass through");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"flag":true,"other":false}"#);
    }

    #[test]
    fn test_empty_object() {
        let data = serde_json::json!({});
        let cb = CanonicalBytes::new(&data).expect("empty object should work");
        assert_eq!(cb.as_bytes(), b"{}");
    }

    #[test]
    fn test_string_value() {
        let data = "hello world";
        let cb = CanonicalBytes::new(&data).expect("string should work");
        assert_eq!(cb.as_bytes(), b"\"hello world\"");
    }

    #[test]
    fn test_len_and_is_empty() {
        let data = serde_json::json!({"a": 1});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(!cb.is_empty());
        assert!(cb.len() > 0);
    }

    #[test]
    fn test_negative_integer() {
        let data = serde_json::json!({"val": -42});
        let cb = CanonicalBytes::new(&data).expect("negative ints should work");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"val":-42}"#);
    }

    #[test]
    fn test_large_integer() {
        let data = serde_json::json!({"val": 9999999999i64});
        let cb = CanonicalBytes::new(&data).expect("large ints should work");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"val":9999999999}"#);
    }

    #[test]
    fn test_deeply_nested_float_rejected() {
        let data = serde_json::json!({"a": {"b": [{"c": 3.14}]}});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn test_unicode_passthrough() {
        // Non-ASCII chars pass through as UTF-8, not \u escapes.
        let data = serde_json::json!({"name": "\u{00e9}\u{00e8}\u{00ea}"});
        let cb = CanonicalBytes::new(&data).expect("unicode should pass through");
        let bytes = cb.as_bytes();
        let s = std::str::from_utf8(bytes).unwrap();
        assert!(s.contains('\u{00e9}'));
    }
}
