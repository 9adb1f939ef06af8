//! # Identifier Newtypes
//!
//! Distinct types for credential, schema, issuer and signer identifiers so
//! one cannot be passed where another is expected. All are non-empty,
//! whitespace-trimmed strings; the ledger and key store own their formats.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::InvalidIdentifier {
                        kind: $kind,
                        reason: "must not be empty".to_string(),
                    });
                }
                if trimmed.chars().any(char::is_control) {
                    return Err(CoreError::InvalidIdentifier {
                        kind: $kind,
                        reason: "must not contain control characters".to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identifier of one issued credential instance (the ledger key).
    CredentialId,
    "credential id"
);

string_id!(
    /// Version tag of a credential schema, e.g. `v1`.
    SchemaVersion,
    "schema version"
);

string_id!(
    /// Identity of the issuing institution, used to scope orderings.
    IssuerId,
    "issuer id"
);

string_id!(
    /// Identity whose private key the key store resolves for signing.
    SignerId,
    "signer id"
);

impl CredentialId {
    /// Generate a fresh random credential identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_and_validated() {
        let id = SchemaVersion::new("  v1 ").unwrap();
        assert_eq!(id.as_str(), "v1");
        assert!(SchemaVersion::new("   ").is_err());
        assert!(IssuerId::new("uni\u{0007}").is_err());
    }

    #[test]
    fn test_generated_credential_ids_are_unique() {
        assert_ne!(CredentialId::generate(), CredentialId::generate());
    }

    #[test]
    fn test_serde_rejects_empty() {
        let ok: SignerId = serde_json::from_str("\"registrar\"").unwrap();
        assert_eq!(ok.to_string(), "registrar");
        assert!(serde_json::from_str::<SignerId>("\"\"").is_err());
    }
}
