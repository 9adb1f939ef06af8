use dac_core::CanonicalizationError;
use dac_crypto::CryptoError;
use thiserror::Error;

/// Errors assembling, canonicalizing or checking a disclosure artifact.
#[derive(Error, Debug)]
pub enum VcError {
    /// The artifact could not be rendered as canonical bytes.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Attestation signing or verification failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The artifact contradicts itself (indices, names or counts).
    #[error("inconsistent disclosure proof: {0}")]
    Inconsistent(String),

    /// The artifact does not match the field ordering it claims.
    #[error("disclosure proof does not match ordering: {0}")]
    OrderingMismatch(String),
}
