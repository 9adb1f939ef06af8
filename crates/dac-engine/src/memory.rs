//! # In-Memory Adapters
//!
//! Process-local implementations of the ports, used by tests and by the
//! CLI (which loads and saves them as JSON files), plus the caller-side
//! ordering cache.
//!
//! All locks are `parking_lot` and are never held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use dac_core::{CredentialId, FieldOrdering, Hash256, IssuerId, SchemaVersion, SignerId};
use dac_crypto::SigningKeyHandle;
use parking_lot::RwLock;

use crate::error::{KeyStoreError, LedgerError, OrderingError};
use crate::ports::{KeyStore, OrderResolver, RootLedger};

type OrderingKey = (SchemaVersion, IssuerId);

/// Orderings held in a map keyed by (schema version, issuer).
#[derive(Debug, Default)]
pub struct InMemoryOrderResolver {
    orderings: RwLock<HashMap<OrderingKey, Arc<FieldOrdering>>>,
}

impl InMemoryOrderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an ordering. A published ordering is never replaced; the
    /// return value is `false` if one already existed for the key.
    pub fn publish(&self, ordering: FieldOrdering) -> bool {
        let key = (ordering.schema_version().clone(), ordering.issuer().clone());
        let mut map = self.orderings.write();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, Arc::new(ordering));
        true
    }
}

impl FromIterator<FieldOrdering> for InMemoryOrderResolver {
    fn from_iter<I: IntoIterator<Item = FieldOrdering>>(iter: I) -> Self {
        let resolver = Self::new();
        for ordering in iter {
            resolver.publish(ordering);
        }
        resolver
    }
}

impl OrderResolver for InMemoryOrderResolver {
    async fn get_ordering(
        &self,
        schema: &SchemaVersion,
        issuer: &IssuerId,
    ) -> Result<Arc<FieldOrdering>, OrderingError> {
        self.orderings
            .read()
            .get(&(schema.clone(), issuer.clone()))
            .cloned()
            .ok_or_else(|| OrderingError::SchemaNotFound {
                schema: schema.clone(),
                issuer: issuer.clone(),
            })
    }
}

/// Caches orderings from an inner resolver.
///
/// Orderings are immutable once published, so entries never expire.
/// Failures are not cached.
#[derive(Debug)]
pub struct CachingOrderResolver<R> {
    inner: R,
    cache: RwLock<HashMap<OrderingKey, Arc<FieldOrdering>>>,
}

impl<R: OrderResolver> CachingOrderResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached orderings.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: OrderResolver> OrderResolver for CachingOrderResolver<R> {
    async fn get_ordering(
        &self,
        schema: &SchemaVersion,
        issuer: &IssuerId,
    ) -> Result<Arc<FieldOrdering>, OrderingError> {
        let key = (schema.clone(), issuer.clone());
        let hit = self.cache.read().get(&key).cloned();
        if let Some(ordering) = hit {
            return Ok(ordering);
        }
        let ordering = self.inner.get_ordering(schema, issuer).await?;
        self.cache.write().entry(key).or_insert_with(|| Arc::clone(&ordering));
        Ok(ordering)
    }
}

/// Write-once root store.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    roots: RwLock<HashMap<CredentialId, Hash256>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every committed root.
    pub fn entries(&self) -> Vec<(CredentialId, Hash256)> {
        let mut entries: Vec<_> = self
            .roots
            .read()
            .iter()
            .map(|(id, root)| (id.clone(), *root))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.roots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.read().is_empty()
    }
}

impl FromIterator<(CredentialId, Hash256)> for InMemoryLedger {
    fn from_iter<I: IntoIterator<Item = (CredentialId, Hash256)>>(iter: I) -> Self {
        Self {
            roots: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl RootLedger for InMemoryLedger {
    async fn get_committed_root(&self, id: &CredentialId) -> Result<Hash256, LedgerError> {
        self.roots
            .read()
            .get(id)
            .copied()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    async fn put_committed_root(&self, id: &CredentialId, root: Hash256) -> Result<(), LedgerError> {
        let mut roots = self.roots.write();
        match roots.get(id) {
            Some(existing) if *existing == root => Ok(()),
            Some(_) => Err(LedgerError::AlreadyCommitted(id.clone())),
            None => {
                roots.insert(id.clone(), root);
                Ok(())
            }
        }
    }
}

/// Signing keys held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<SignerId, Arc<SigningKeyHandle>>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the key for `signer`.
    pub fn insert(&self, signer: SignerId, key: SigningKeyHandle) {
        self.keys.write().insert(signer, Arc::new(key));
    }
}

impl KeyStore for InMemoryKeyStore {
    async fn resolve(&self, signer: &SignerId) -> Result<Arc<SigningKeyHandle>, KeyStoreError> {
        self.keys
            .read()
            .get(signer)
            .cloned()
            .ok_or_else(|| KeyStoreError::NotFound(signer.clone()))
    }
}
