//! # Issuer Attestations
//!
//! An attestation is an issuer's signature over the SHA-256 digest of a
//! message, usually a committed root or a disclosure proof's canonical
//! bytes. It endorses the message independently of the ledger: anyone
//! holding the message and the attestation can check it without network
//! access.
//!
//! The signed bytes are the 32 digest bytes, so a root attestation and a
//! proof attestation follow the same verification path.

use dac_core::{message_digest, Hash256, SignerId};
use serde::{Deserialize, Serialize};

use crate::ed25519::{sign_message, verify_message, Ed25519PublicKey, Ed25519Signature, SigningKeyHandle};
use crate::error::CryptoError;

/// A signature over `H(message)` plus the identity that produced it.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// `H(message)`.
    pub digest: Hash256,
    /// Ed25519 signature over the digest bytes.
    pub signature: Ed25519Signature,
    /// Who signed.
    pub signer: SignerId,
    /// Public key of the signer at signing time.
    pub public_key: Ed25519PublicKey,
}

impl Attestation {
    /// Sign `message` on behalf of `signer`.
    ///
    /// # Errors
    ///
    /// `InvalidMessage` when `message` is empty.
    pub fn sign(
        message: &[u8],
        signer: SignerId,
        key: &SigningKeyHandle,
    ) -> Result<Self, CryptoError> {
        if message.is_empty() {
            return Err(CryptoError::InvalidMessage);
        }
        let digest = message_digest(message);
        let signature = sign_message(digest.as_bytes(), key)?;
        Ok(Self {
            digest,
            signature,
            signer,
            public_key: key.public_key(),
        })
    }

    /// Sign a root hash directly.
    pub fn sign_root(
        root: &Hash256,
        signer: SignerId,
        key: &SigningKeyHandle,
    ) -> Result<Self, CryptoError> {
        Self::sign(root.as_bytes(), signer, key)
    }

    /// Check that this attestation covers `message` and the signature holds.
    pub fn verify(&self, message: &[u8]) -> Result<(), CryptoError> {
        let digest = message_digest(message);
        if digest != self.digest {
            return Err(CryptoError::VerificationFailed(format!(
                "message digest {digest} does not match attested digest {}",
                self.digest
            )));
        }
        self.verify_digest()
    }

    /// Check the signature over the carried digest alone.
    pub fn verify_digest(&self) -> Result<(), CryptoError> {
        verify_message(self.digest.as_bytes(), &self.signature, &self.public_key)
    }

    /// Like [`verify`](Self::verify), additionally pinning the expected key.
    pub fn verify_with_key(
        &self,
        message: &[u8],
        expected: &Ed25519PublicKey,
    ) -> Result<(), CryptoError> {
        if &self.public_key != expected {
            return Err(CryptoError::VerificationFailed(format!(
                "attestation signed by {}, expected {expected}",
                self.public_key
            )));
        }
        self.verify(message)
    }
}
