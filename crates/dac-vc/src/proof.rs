//! # Attested Disclosures
//!
//! A disclosure proof endorsed by the issuer. The attestation signs the
//! SHA-256 digest of the proof's canonical bytes, so any edit to the proof
//! (including the presentation id) invalidates it.

use dac_core::SignerId;
use dac_crypto::{Attestation, Ed25519PublicKey, SigningKeyHandle};
use serde::{Deserialize, Serialize};

use crate::disclosure::DisclosureProof;
use crate::error::VcError;

/// The type of cryptographic proof on an attested disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofType {
    /// Ed25519 signature over the JCS digest.
    Ed25519Signature2020,
}

/// A disclosure proof plus the issuer's attestation over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttestedDisclosure {
    pub proof: DisclosureProof,
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub attestation: Attestation,
}

impl AttestedDisclosure {
    /// Sign `proof` with `key` on behalf of `signer`.
    pub fn attest(
        proof: DisclosureProof,
        signer: SignerId,
        key: &SigningKeyHandle,
    ) -> Result<Self, VcError> {
        let message = proof.canonical_bytes()?;
        let attestation = Attestation::sign(message.as_bytes(), signer, key)?;
        Ok(Self {
            proof,
            proof_type: ProofType::Ed25519Signature2020,
            attestation,
        })
    }

    /// Check the attestation covers this exact proof.
    ///
    /// This does not verify the multiproof itself.
    pub fn verify_attestation(&self) -> Result<(), VcError> {
        let message = self.proof.canonical_bytes()?;
        Ok(self.attestation.verify(message.as_bytes())?)
    }

    /// Like [`verify_attestation`](Self::verify_attestation), pinning the
    /// signer's public key.
    pub fn verify_attestation_with_key(&self, expected: &Ed25519PublicKey) -> Result<(), VcError> {
        let message = self.proof.canonical_bytes()?;
        Ok(self.attestation.verify_with_key(message.as_bytes(), expected)?)
    }
}
