//! # Error Types: Input Error Taxonomy
//!
//! Every malformed input the engine can receive is a typed variant here.
//! Input errors are raised before any hashing takes place and are never
//! coerced into a default value.

use thiserror::Error;

/// Errors raised while constructing or reading the credential data model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A field ordering with zero entries.
    #[error("field ordering is empty")]
    EmptyOrdering,

    /// A field name appears more than once in an ordering.
    #[error("field ordering contains duplicate field {0:?}")]
    DuplicateField(String),

    /// A field required by the ordering is absent from the credential.
    #[error("credential is missing field {0:?} required by the ordering")]
    MissingField(String),

    /// A requested field name is not part of the ordering.
    #[error("field {0:?} is not part of the ordering")]
    UnknownField(String),

    /// A field value cannot be represented canonically.
    #[error("field {field:?} has an unsupported value: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An identifier failed validation.
    #[error("invalid {kind}: {reason}")]
    InvalidIdentifier {
        /// Identifier kind (e.g. "credential id").
        kind: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A hash failed to parse from its hex form.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// A timestamp failed to parse.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
