//! # dac-crypto: Selective Disclosure Proof Engine
//!
//! The cryptographic core of the credential system:
//!
//! - **Merkle Tree Builder** (`merkle.rs`): a complete binary SHA-256 tree
//!   over a credential's ordered field values, padded by repeating the last
//!   leaf up to the next power of two.
//! - **Multiproof** (`multiproof.rs`): generation of the minimal auxiliary
//!   hash set plus reconstruction plan for an arbitrary disclosed subset,
//!   and total verification that never panics on attacker-controlled input.
//! - **Ed25519** (`ed25519.rs`): key handles, signatures, public keys.
//! - **Attestation** (`attestation.rs`): issuer endorsement of a root or a
//!   proof digest, verifiable without the ledger.
//!
//! ## Crate Policy
//!
//! - Depends only on `dac-core` internally.
//! - All hashing goes through `dac_core::{leaf_hash, node_hash, message_digest}`.
//! - Pure and synchronous: no I/O, no shared mutable state. Every tree and
//!   proof is owned by the caller that built it.
//! - No mocking of cryptographic operations in tests.

pub mod attestation;
pub mod ed25519;
pub mod error;
pub mod merkle;
pub mod multiproof;

pub use attestation::Attestation;
pub use ed25519::{
    sign_message, verify_message, Ed25519PublicKey, Ed25519Signature, SigningKeyHandle,
};
pub use error::{CryptoError, MerkleError};
pub use merkle::MerkleTree;
pub use multiproof::{
    check_multiproof, generate_multiproof, verify_multiproof, Multiproof, PlanStep, Rejection,
};
