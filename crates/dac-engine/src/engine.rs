//! # Disclosure Engine
//!
//! Orchestrates one request at a time against the three ports:
//!
//! ```text
//! commit:  ordering -> values -> tree -> ledger.put(root)
//! prove:   ordering -> indices -> values -> ledger.get(root) -> tree
//!          -> compare roots -> multiproof -> DisclosureProof [-> attest]
//! verify:  ordering + ledger.get(root) -> structural checks -> replay
//! ```
//!
//! Input errors are raised before any hashing. Every port call is bounded
//! by the configured timeout; expiry is reported as that port being
//! unavailable and is never retried here. The engine holds no state
//! between calls, so a request can be dropped at any await point.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dac_core::{Credential, CredentialId, FieldOrdering, Hash256, SignerId};
use dac_crypto::merkle::depth_for;
use dac_crypto::{
    check_multiproof, generate_multiproof, Attestation, MerkleError, MerkleTree, SigningKeyHandle,
};
use dac_vc::{AttestedDisclosure, DisclosureProof};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ports::{KeyStore, OrderResolver, RootLedger};

/// Outcome of verifying a disclosure proof.
///
/// A rejection is a normal result, not an error. `reason` is diagnostic
/// only and never contains hidden field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Whether every check passed.
    pub accepted: bool,
    /// Why the proof was rejected; `None` when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationReport {
    /// A passing report.
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    /// A failing report with a diagnostic reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
        }
    }
}

/// The disclosure engine over an ordering source, a root ledger and a key
/// store.
#[derive(Debug)]
pub struct DisclosureEngine<O, L, K> {
    resolver: O,
    ledger: L,
    keys: K,
    config: EngineConfig,
}

impl<O, L, K> DisclosureEngine<O, L, K>
where
    O: OrderResolver,
    L: RootLedger,
    K: KeyStore,
{
    /// Assemble an engine from its three ports and timeouts.
    pub fn new(resolver: O, ledger: L, keys: K, config: EngineConfig) -> Self {
        Self {
            resolver,
            ledger,
            keys,
            config,
        }
    }

    /// Timeouts in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The ordering source.
    pub fn resolver(&self) -> &O {
        &self.resolver
    }

    /// The root ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Compute a credential's root without touching the ledger.
    pub async fn compute_root(&self, credential: &Credential) -> Result<Hash256, EngineError> {
        let ordering = self.ordering_for(credential).await?;
        let tree = MerkleTree::from_credential(credential, &ordering)?;
        Ok(tree.root())
    }

    /// Build the credential's tree and commit its root.
    ///
    /// Committing the same root twice succeeds; a different root for an
    /// already committed credential is `AlreadyCommitted`.
    pub async fn build_and_commit(
        &self,
        id: &CredentialId,
        credential: &Credential,
    ) -> Result<Hash256, EngineError> {
        let ordering = self.ordering_for(credential).await?;
        let tree = MerkleTree::from_credential(credential, &ordering)?;
        let root = tree.root();
        debug!(
            credential_id = %id,
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "built credential tree"
        );

        bounded(
            self.config.ledger_timeout,
            self.ledger.put_committed_root(id, root),
            EngineError::LedgerUnavailable,
        )
        .await?;

        metrics::counter!("dac_roots_committed_total").increment(1);
        info!(credential_id = %id, root = %root, "committed credential root");
        Ok(root)
    }

    /// Produce a disclosure proof for `fields` of a committed credential.
    ///
    /// # Errors
    ///
    /// Input errors (`UnknownField`, empty `fields`, `MissingField`) come
    /// first. `CommittedRootMismatch` if the credential no longer rebuilds
    /// to the ledger's root.
    pub async fn create_disclosure_proof(
        &self,
        id: &CredentialId,
        credential: &Credential,
        fields: &[String],
    ) -> Result<DisclosureProof, EngineError> {
        let ordering = self.ordering_for(credential).await?;
        let indices = ordering.indices_for(fields)?;
        if indices.is_empty() {
            return Err(MerkleError::EmptyTarget.into());
        }
        let values = credential.ordered_values(&ordering)?;

        let committed = self.committed_root(id).await?;
        let tree = MerkleTree::build(&values)?;
        let rebuilt = tree.root();
        if rebuilt != committed {
            warn!(
                credential_id = %id,
                committed = %committed,
                rebuilt = %rebuilt,
                "credential record no longer matches its committed root"
            );
            return Err(EngineError::CommittedRootMismatch {
                id: id.clone(),
                committed,
                rebuilt,
            });
        }

        let multiproof = generate_multiproof(&tree, indices.iter().copied())?;
        debug!(
            credential_id = %id,
            disclosed = indices.len(),
            auxiliary = multiproof.siblings.len(),
            "generated multiproof"
        );
        let proof =
            DisclosureProof::from_multiproof(id.clone(), &ordering, &values, multiproof, committed)?;

        metrics::counter!("dac_proofs_generated_total").increment(1);
        info!(
            credential_id = %id,
            presentation_id = %proof.presentation_id,
            fields = ?fields,
            "created disclosure proof"
        );
        Ok(proof)
    }

    /// [`create_disclosure_proof`](Self::create_disclosure_proof) followed by
    /// an attestation from `signer`.
    pub async fn create_attested_disclosure(
        &self,
        id: &CredentialId,
        credential: &Credential,
        fields: &[String],
        signer: &SignerId,
    ) -> Result<AttestedDisclosure, EngineError> {
        let proof = self.create_disclosure_proof(id, credential, fields).await?;
        let key = self.signing_key(signer).await?;
        let attested = AttestedDisclosure::attest(proof, signer.clone(), &key)?;
        metrics::counter!("dac_attestations_total", "subject" => "disclosure").increment(1);
        info!(credential_id = %id, signer = %signer, "attested disclosure proof");
        Ok(attested)
    }

    /// Sign the committed root of `id` on behalf of `signer`.
    pub async fn attest_root(
        &self,
        id: &CredentialId,
        signer: &SignerId,
    ) -> Result<Attestation, EngineError> {
        let root = self.committed_root(id).await?;
        let key = self.signing_key(signer).await?;
        let attestation = Attestation::sign_root(&root, signer.clone(), &key)?;
        metrics::counter!("dac_attestations_total", "subject" => "root").increment(1);
        info!(credential_id = %id, signer = %signer, root = %root, "attested committed root");
        Ok(attestation)
    }

    /// Verify `proof` for credential `id` against the ledger's root.
    ///
    /// Returns `Err` only when the ordering source or ledger fails. A proof
    /// that names an unknown schema or an uncommitted credential is
    /// rejected.
    pub async fn verify_disclosure(
        &self,
        id: &CredentialId,
        proof: &DisclosureProof,
    ) -> Result<VerificationReport, EngineError> {
        let report = self.check_disclosure(id, proof).await?;
        record_verification(id, &report);
        Ok(report)
    }

    /// Check the attestation against the key registered for its signer,
    /// then the disclosure itself.
    ///
    /// The public key carried in the attestation is not trusted: a proof
    /// signed by any key other than the signer's registered one, or by an
    /// unknown signer, is rejected. Key store outages are `Err`.
    pub async fn verify_attested_disclosure(
        &self,
        id: &CredentialId,
        attested: &AttestedDisclosure,
    ) -> Result<VerificationReport, EngineError> {
        let report = match self.check_attestation(attested).await? {
            Some(rejected) => rejected,
            None => self.check_disclosure(id, &attested.proof).await?,
        };
        record_verification(id, &report);
        Ok(report)
    }

    /// `Some(report)` when the attestation does not hold for its signer.
    async fn check_attestation(
        &self,
        attested: &AttestedDisclosure,
    ) -> Result<Option<VerificationReport>, EngineError> {
        let signer = &attested.attestation.signer;
        let registered = match self.signing_key(signer).await {
            Ok(key) => key.public_key(),
            Err(EngineError::KeyNotFound(_)) => {
                return Ok(Some(VerificationReport::rejected(format!(
                    "attestation signer {signer} is unknown"
                ))))
            }
            Err(e) => return Err(e),
        };
        Ok(attested
            .verify_attestation_with_key(&registered)
            .err()
            .map(|e| {
                VerificationReport::rejected(format!(
                    "attestation invalid for signer {signer}: {e}"
                ))
            }))
    }

    async fn check_disclosure(
        &self,
        id: &CredentialId,
        proof: &DisclosureProof,
    ) -> Result<VerificationReport, EngineError> {
        if &proof.credential_id != id {
            return Ok(VerificationReport::rejected(format!(
                "proof is for credential {}",
                proof.credential_id
            )));
        }

        let ordering = match bounded(
            self.config.ordering_timeout,
            self.resolver
                .get_ordering(&proof.schema_version, &proof.issuer),
            EngineError::OrderingUnavailable,
        )
        .await
        {
            Ok(ordering) => ordering,
            Err(EngineError::SchemaNotFound { schema, issuer }) => {
                return Ok(VerificationReport::rejected(format!(
                    "unknown schema {schema} of issuer {issuer}"
                )))
            }
            Err(e) => return Err(e),
        };

        let committed = match self.committed_root(id).await {
            Ok(root) => root,
            Err(EngineError::RootNotFound(_)) => {
                return Ok(VerificationReport::rejected(format!(
                    "no committed root for credential {id}"
                )))
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = proof.check_ordering(&ordering) {
            return Ok(VerificationReport::rejected(e.to_string()));
        }
        if proof.root != committed {
            return Ok(VerificationReport::rejected(format!(
                "proof targets root {}, ledger holds {committed}",
                proof.root
            )));
        }
        let Some(depth) = depth_for(ordering.len()) else {
            return Ok(VerificationReport::rejected("ordering has no fields"));
        };

        let multiproof = proof.multiproof();
        Ok(
            match check_multiproof(proof.disclosed_values(), &multiproof, &committed, depth) {
                Ok(()) => VerificationReport::accepted(),
                Err(rejection) => VerificationReport::rejected(rejection.to_string()),
            },
        )
    }

    async fn ordering_for(
        &self,
        credential: &Credential,
    ) -> Result<Arc<FieldOrdering>, EngineError> {
        bounded(
            self.config.ordering_timeout,
            self.resolver
                .get_ordering(&credential.schema_version, &credential.issuer),
            EngineError::OrderingUnavailable,
        )
        .await
    }

    async fn committed_root(&self, id: &CredentialId) -> Result<Hash256, EngineError> {
        bounded(
            self.config.ledger_timeout,
            self.ledger.get_committed_root(id),
            EngineError::LedgerUnavailable,
        )
        .await
    }

    async fn signing_key(&self, signer: &SignerId) -> Result<Arc<SigningKeyHandle>, EngineError> {
        bounded(
            self.config.key_store_timeout,
            self.keys.resolve(signer),
            EngineError::KeyUnavailable,
        )
        .await
    }
}

/// Await a port call under `limit`; expiry becomes `on_timeout`.
async fn bounded<T, E, F>(
    limit: Duration,
    call: F,
    on_timeout: fn(String) -> EngineError,
) -> Result<T, EngineError>
where
    F: Future<Output = Result<T, E>>,
    EngineError: From<E>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(EngineError::from),
        Err(_) => Err(on_timeout(format!("timed out after {limit:?}"))),
    }
}

fn record_verification(id: &CredentialId, report: &VerificationReport) {
    let outcome = if report.accepted { "accepted" } else { "rejected" };
    metrics::counter!("dac_verifications_total", "outcome" => outcome).increment(1);
    match &report.reason {
        None => info!(credential_id = %id, "disclosure proof accepted"),
        Some(reason) => warn!(credential_id = %id, reason = %reason, "disclosure proof rejected"),
    }
}

