//! # Hash Primitive
//!
//! SHA-256 is the single hash function of the engine. These entry points
//! are the only callers of `sha2` in the workspace:
//!
//! - [`leaf_hash`]: `H(utf8(canonical_string(value)))`
//! - [`node_hash`]: `H(left || right)`, left operand first, never sorted
//! - [`sha256_digest`]: `H(canonical_bytes)` for structured artifacts
//! - [`message_digest`]: `H(message)` for opaque messages being attested
//!
//! These concatenation and encoding rules are protocol constants. Build,
//! proof generation and verification all call the same functions, so roots
//! cannot drift between them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;
use crate::field::FieldValue;

/// A 32-byte SHA-256 output.
///
/// Serializes as a lowercase 64-character hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse from a 64-character hex string (case-insensitive, trimmed).
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(CoreError::InvalidHash(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| CoreError::InvalidHash(format!("invalid hex: {e}")))?;
            out[i] = u8::from_str_radix(s, 16)
                .map_err(|e| CoreError::InvalidHash(format!("invalid hex at byte {i}: {e}")))?;
        }
        Ok(Self(out))
    }

    fn of(bytes: &[u8]) -> Self {
        let hash = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        Self(out)
    }
}

impl std::fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Hash256 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Hash one field value into a Merkle leaf.
pub fn leaf_hash(value: &FieldValue) -> Hash256 {
    Hash256::of(value.canonical_string().as_bytes())
}

/// Hash two child nodes into their parent: `H(left || right)`.
pub fn node_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(&left.0);
    input[32..].copy_from_slice(&right.0);
    Hash256::of(&input)
}

/// Hash canonical artifact bytes.
///
/// Accepts only `&CanonicalBytes`, so structured artifacts cannot be hashed
/// over a non-canonical serialization.
pub fn sha256_digest(data: &CanonicalBytes) -> Hash256 {
    Hash256::of(data.as_bytes())
}

/// Hash an opaque message (the digest recorded in an attestation).
pub fn message_digest(message: &[u8]) -> Hash256 {
    Hash256::of(message)
}
