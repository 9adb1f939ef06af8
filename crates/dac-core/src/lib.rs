//! # dac-core: Foundational Types for the Disclosure Engine
//!
//! This crate is the leaf of the workspace DAG. It defines the data model
//! every other crate builds on and the single hash primitive that all
//! Merkle and artifact digests flow through.
//!
//! ## Key Design Principles
//!
//! 1. **One hash primitive.** [`leaf_hash`], [`node_hash`],
//!    [`sha256_digest`] and [`message_digest`] are the only places SHA-256
//!    is invoked. Leaves are `H(canonical_string(value))`, nodes are
//!    `H(left || right)` with no sorting and no prefix.
//!
//! 2. **Canonical field values.** [`FieldValue`] renders to exactly one
//!    canonical string. Floats are rejected at construction; dates render
//!    as `YYYY-MM-DD`.
//!
//! 3. **Position is identity.** A [`FieldOrdering`] fixes which field sits
//!    at which leaf. It is validated once (non-empty, unique) and never
//!    mutated.
//!
//! 4. **Missing is an error.** [`Credential::ordered_values`] refuses to
//!    substitute an empty string for an absent field.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dac-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod credential;
pub mod digest;
pub mod error;
pub mod field;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use credential::{Credential, FieldOrdering};
pub use digest::{leaf_hash, message_digest, node_hash, sha256_digest, Hash256};
pub use error::{CanonicalizationError, CoreError};
pub use field::FieldValue;
pub use identity::{CredentialId, IssuerId, SchemaVersion, SignerId};
pub use temporal::Timestamp;
