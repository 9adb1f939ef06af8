//! # Disclosure Proof
//!
//! The persisted wire artifact for one presentation of a credential:
//! which fields are revealed, at which leaf positions, with which values,
//! and the multiproof connecting them to the root the issuer committed.
//!
//! Leaf hashes of the disclosed fields are not carried; the verifier
//! always recomputes them from the values. The plan is carried explicitly
//! and is cross-checked against the indices during verification.

use dac_core::{
    leaf_hash, sha256_digest, CanonicalBytes, CredentialId, FieldOrdering, FieldValue, Hash256,
    IssuerId, SchemaVersion, Timestamp,
};
use dac_crypto::{Multiproof, PlanStep};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VcError;

/// One revealed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisclosedField {
    pub name: String,
    pub index: usize,
    pub value: FieldValue,
}

/// A selective-disclosure proof against a committed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisclosureProof {
    /// Fresh identifier per presentation.
    pub presentation_id: Uuid,
    pub credential_id: CredentialId,
    pub schema_version: SchemaVersion,
    pub issuer: IssuerId,
    /// Revealed fields in ascending index order.
    pub disclosed: Vec<DisclosedField>,
    /// Real leaf count of the committed tree.
    pub leaf_count: usize,
    pub depth: u32,
    /// Auxiliary sibling hashes in consumption order.
    pub auxiliary: Vec<Hash256>,
    pub plan: Vec<PlanStep>,
    /// The root the proof reconstructs to.
    pub root: Hash256,
    pub created_at: Timestamp,
}

impl DisclosureProof {
    /// Assemble the artifact from a generated multiproof.
    ///
    /// `values` are the credential's values in ordering order; only the
    /// entries at `proof.indices` are copied into the artifact.
    pub fn from_multiproof(
        credential_id: CredentialId,
        ordering: &FieldOrdering,
        values: &[FieldValue],
        proof: Multiproof,
        root: Hash256,
    ) -> Result<Self, VcError> {
        if values.len() != ordering.len() || proof.leaf_count != ordering.len() {
            return Err(VcError::Inconsistent(format!(
                "{} values and {} leaves for an ordering of {} fields",
                values.len(),
                proof.leaf_count,
                ordering.len()
            )));
        }
        let disclosed = proof
            .indices
            .iter()
            .map(|&index| {
                let name = ordering.name_at(index).ok_or_else(|| {
                    VcError::Inconsistent(format!("index {index} outside the ordering"))
                })?;
                Ok(DisclosedField {
                    name: name.to_string(),
                    index,
                    value: values[index].clone(),
                })
            })
            .collect::<Result<Vec<_>, VcError>>()?;

        Ok(Self {
            presentation_id: Uuid::new_v4(),
            credential_id,
            schema_version: ordering.schema_version().clone(),
            issuer: ordering.issuer().clone(),
            disclosed,
            leaf_count: proof.leaf_count,
            depth: proof.depth,
            auxiliary: proof.siblings,
            plan: proof.plan,
            root,
            created_at: Timestamp::now(),
        })
    }

    /// Disclosed indices in artifact order.
    pub fn indices(&self) -> Vec<usize> {
        self.disclosed.iter().map(|f| f.index).collect()
    }

    /// `(index, value)` pairs for the multiproof verifier.
    pub fn disclosed_values(&self) -> impl Iterator<Item = (usize, &FieldValue)> {
        self.disclosed.iter().map(|f| (f.index, &f.value))
    }

    /// Look up a disclosed value by field name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.disclosed
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// Rebuild the multiproof carried by this artifact.
    ///
    /// Leaf hashes are recomputed from the disclosed values.
    pub fn multiproof(&self) -> Multiproof {
        Multiproof {
            indices: self.indices(),
            leaf_count: self.leaf_count,
            depth: self.depth,
            leaves: self.disclosed.iter().map(|f| leaf_hash(&f.value)).collect(),
            siblings: self.auxiliary.clone(),
            plan: self.plan.clone(),
        }
    }

    /// Check that names, indices and counts agree with `ordering`.
    pub fn check_ordering(&self, ordering: &FieldOrdering) -> Result<(), VcError> {
        if ordering.schema_version() != &self.schema_version || ordering.issuer() != &self.issuer {
            return Err(VcError::OrderingMismatch(format!(
                "proof is for {}/{}, ordering is {}/{}",
                self.issuer,
                self.schema_version,
                ordering.issuer(),
                ordering.schema_version()
            )));
        }
        if self.leaf_count != ordering.len() {
            return Err(VcError::OrderingMismatch(format!(
                "proof claims {} leaves, ordering has {}",
                self.leaf_count,
                ordering.len()
            )));
        }
        for field in &self.disclosed {
            if ordering.index_of(&field.name) != Some(field.index) {
                return Err(VcError::OrderingMismatch(format!(
                    "field {:?} is not at index {}",
                    field.name, field.index
                )));
            }
        }
        Ok(())
    }

    /// JCS bytes of the whole artifact; the attestation message.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, VcError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// SHA-256 of [`canonical_bytes`](Self::canonical_bytes).
    pub fn digest(&self) -> Result<Hash256, VcError> {
        Ok(sha256_digest(&self.canonical_bytes()?))
    }
}
