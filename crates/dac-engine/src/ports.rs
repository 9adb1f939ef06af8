//! # External Ports
//!
//! The engine's only suspension points. Each port is a trait with `Send`
//! futures so engines can be shared across tokio tasks behind an `Arc`.
//! Adapters decide their own transport; the engine wraps every call in a
//! timeout and never retries.

use std::future::Future;
use std::sync::Arc;

use dac_core::{CredentialId, FieldOrdering, Hash256, IssuerId, SchemaVersion, SignerId};
use dac_crypto::SigningKeyHandle;

use crate::error::{KeyStoreError, LedgerError, OrderingError};

/// Supplies the canonical field ordering for a schema version.
///
/// Orderings are immutable once published; the returned value is a
/// snapshot for the current call.
pub trait OrderResolver: Send + Sync {
    fn get_ordering(
        &self,
        schema: &SchemaVersion,
        issuer: &IssuerId,
    ) -> impl Future<Output = Result<Arc<FieldOrdering>, OrderingError>> + Send;
}

/// Stores the committed root per credential.
///
/// A committed root is write-once: putting the same root again succeeds,
/// putting a different one is `AlreadyCommitted`.
pub trait RootLedger: Send + Sync {
    fn get_committed_root(
        &self,
        id: &CredentialId,
    ) -> impl Future<Output = Result<Hash256, LedgerError>> + Send;

    fn put_committed_root(
        &self,
        id: &CredentialId,
        root: Hash256,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;
}

/// Resolves a signer identity to its private key.
pub trait KeyStore: Send + Sync {
    fn resolve(
        &self,
        signer: &SignerId,
    ) -> impl Future<Output = Result<Arc<SigningKeyHandle>, KeyStoreError>> + Send;
}
