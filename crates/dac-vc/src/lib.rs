//! # dac-vc: Disclosure Artifacts
//!
//! The documents a holder hands to a verifier:
//!
//! - **Disclosure proof** (`disclosure.rs`): disclosed field names, indices
//!   and values plus the multiproof and the committed root it targets.
//! - **Attested disclosure** (`proof.rs`): a disclosure proof together with
//!   the issuer's Ed25519 attestation over its canonical bytes.
//!
//! ## Security Invariant
//!
//! Artifact digests are computed from `CanonicalBytes` only. A proof never
//! carries hidden field values or the leaf hashes of undisclosed fields
//! other than the auxiliary hashes the multiproof needs.
//!
//! ## Crate Policy
//!
//! - Depends on `dac-core` and `dac-crypto` internally.
//! - Artifacts reject unknown JSON fields.

pub mod disclosure;
pub mod error;
pub mod proof;

pub use disclosure::{DisclosedField, DisclosureProof};
pub use error::VcError;
pub use proof::{AttestedDisclosure, ProofType};
