//! # Engine Error Types
//!
//! Port errors are what adapters report. [`EngineError`] is what callers of
//! the engine see: input errors (caller's fault, raised before any
//! hashing), external failures (retryable by the caller, never by the
//! engine) and integrity failures.
//!
//! A multiproof that does not verify is not an error; it is a rejected
//! [`VerificationReport`](crate::engine::VerificationReport).

use dac_core::{CoreError, CredentialId, Hash256, IssuerId, SchemaVersion, SignerId};
use dac_crypto::{CryptoError, MerkleError};
use dac_vc::VcError;
use thiserror::Error;

/// Failures of an [`OrderResolver`](crate::ports::OrderResolver).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("no field ordering for schema {schema} of issuer {issuer}")]
    SchemaNotFound {
        schema: SchemaVersion,
        issuer: IssuerId,
    },

    #[error("ordering source unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a [`RootLedger`](crate::ports::RootLedger).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no committed root for credential {0}")]
    NotFound(CredentialId),

    #[error("credential {0} already has a different committed root")]
    AlreadyCommitted(CredentialId),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a [`KeyStore`](crate::ports::KeyStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("no signing key for {0}")]
    NotFound(SignerId),

    #[error("key store unavailable: {0}")]
    Unavailable(String),
}

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad caller input (empty ordering, missing or unknown field, empty
    /// disclosure, out-of-range index).
    #[error("invalid input: {0}")]
    Input(#[from] MerkleError),

    #[error("field ordering for schema {schema} of issuer {issuer} not found")]
    SchemaNotFound {
        schema: SchemaVersion,
        issuer: IssuerId,
    },

    #[error("field ordering unavailable: {0}")]
    OrderingUnavailable(String),

    #[error("no committed root for credential {0}")]
    RootNotFound(CredentialId),

    #[error("credential {0} is already committed with a different root")]
    AlreadyCommitted(CredentialId),

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("no signing key for {0}")]
    KeyNotFound(SignerId),

    #[error("key store unavailable: {0}")]
    KeyUnavailable(String),

    /// The credential record no longer matches what was committed.
    #[error("credential {id} rebuilds to root {rebuilt}, ledger holds {committed}")]
    CommittedRootMismatch {
        id: CredentialId,
        committed: Hash256,
        rebuilt: Hash256,
    },

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    #[error("artifact error: {0}")]
    Artifact(#[from] VcError),
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        Self::Input(MerkleError::Input(e))
    }
}

impl From<OrderingError> for EngineError {
    fn from(e: OrderingError) -> Self {
        match e {
            OrderingError::SchemaNotFound { schema, issuer } => {
                Self::SchemaNotFound { schema, issuer }
            }
            OrderingError::Unavailable(msg) => Self::OrderingUnavailable(msg),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(id) => Self::RootNotFound(id),
            LedgerError::AlreadyCommitted(id) => Self::AlreadyCommitted(id),
            LedgerError::Unavailable(msg) => Self::LedgerUnavailable(msg),
        }
    }
}

impl From<KeyStoreError> for EngineError {
    fn from(e: KeyStoreError) -> Self {
        match e {
            KeyStoreError::NotFound(signer) => Self::KeyNotFound(signer),
            KeyStoreError::Unavailable(msg) => Self::KeyUnavailable(msg),
        }
    }
}

impl EngineError {
    /// True for failures of an external dependency that a caller may retry.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::OrderingUnavailable(_) | Self::LedgerUnavailable(_) | Self::KeyUnavailable(_)
        )
    }
}
