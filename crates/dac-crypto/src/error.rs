//! # Cryptographic Error Types
//!
//! `MerkleError` covers input errors of tree building and proof generation.
//! `CryptoError` covers signing and signature verification. Verification
//! of multiproofs does not use either: it reports a
//! [`Rejection`](crate::multiproof::Rejection) instead.

use dac_core::CoreError;
use thiserror::Error;

/// Input errors raised by tree building and proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// Data model error (empty ordering, missing field, unknown field).
    #[error(transparent)]
    Input(#[from] CoreError),

    /// A disclosure that reveals nothing.
    #[error("target index set is empty")]
    EmptyTarget,

    /// A target index beyond the credential's field count.
    #[error("target index {index} out of range for {leaf_count} leaves")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of real (unpadded) leaves.
        leaf_count: usize,
    },

    /// The tree has no node where its shape requires one.
    #[error("tree has no node at level {level}, index {index}")]
    MissingNode {
        /// Level, 0 being the padded leaf row.
        level: u32,
        /// Position within the level.
        index: usize,
    },
}

/// Errors from Ed25519 signing and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// An empty message was submitted for signing.
    #[error("refusing to sign an empty message")]
    InvalidMessage,

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Signature parsing or verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}
