//! # Credentials and Field Orderings
//!
//! A [`FieldOrdering`] assigns each field name of a schema to a leaf
//! position `0..n`. A [`Credential`] is an unordered name → value map; the
//! ordering projects it onto the leaf sequence.
//!
//! ## Invariants
//!
//! - An ordering has at least one name and no duplicates.
//! - Projection fails on the first field the ordering requires but the
//!   credential lacks. Fields the ordering does not mention are not
//!   committed and are ignored.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::FieldValue;
use crate::identity::{IssuerId, SchemaVersion};

/// The canonical ordering of field names for one schema version and issuer.
///
/// Immutable once constructed. Callers may cache it per schema version; the
/// engine treats every instance it receives as a snapshot for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOrdering", into = "RawOrdering")]
pub struct FieldOrdering {
    schema_version: SchemaVersion,
    issuer: IssuerId,
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct RawOrdering {
    schema_version: SchemaVersion,
    issuer: IssuerId,
    ordering: Vec<String>,
}

impl FieldOrdering {
    /// Validate and construct an ordering.
    ///
    /// # Errors
    ///
    /// `EmptyOrdering` for zero names, `DuplicateField` for a repeated name.
    pub fn new(
        schema_version: SchemaVersion,
        issuer: IssuerId,
        names: Vec<String>,
    ) -> Result<Self, CoreError> {
        if names.is_empty() {
            return Err(CoreError::EmptyOrdering);
        }
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), i).is_some() {
                return Err(CoreError::DuplicateField(name.clone()));
            }
        }
        Ok(Self {
            schema_version,
            issuer,
            names,
            positions,
        })
    }

    /// Schema version this ordering belongs to.
    pub fn schema_version(&self) -> &SchemaVersion {
        &self.schema_version
    }

    /// Issuer this ordering is scoped to.
    pub fn issuer(&self) -> &IssuerId {
        &self.issuer
    }

    /// Field names in leaf order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of fields (unpadded leaf count).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed ordering; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Leaf index of a field name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Field name at a leaf index.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Map a disclosure request (a set of names) to ascending leaf indices.
    ///
    /// # Errors
    ///
    /// `UnknownField` for the first name not in the ordering.
    pub fn indices_for<'a, I>(&self, names: I) -> Result<BTreeSet<usize>, CoreError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .map(|name| {
                self.index_of(name)
                    .ok_or_else(|| CoreError::UnknownField(name.clone()))
            })
            .collect()
    }
}

impl TryFrom<RawOrdering> for FieldOrdering {
    type Error = CoreError;

    fn try_from(raw: RawOrdering) -> Result<Self, Self::Error> {
        Self::new(raw.schema_version, raw.issuer, raw.ordering)
    }
}

impl From<FieldOrdering> for RawOrdering {
    fn from(o: FieldOrdering) -> Self {
        Self {
            schema_version: o.schema_version,
            issuer: o.issuer,
            ordering: o.names,
        }
    }
}

/// One issued credential: the schema it was issued under and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Schema version whose ordering commits this credential.
    pub schema_version: SchemaVersion,
    /// Issuing institution.
    pub issuer: IssuerId,
    /// Field name → value.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Credential {
    /// Create an empty credential.
    pub fn new(schema_version: SchemaVersion, issuer: IssuerId) -> Self {
        Self {
            schema_version,
            issuer,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Build the field map from a flat JSON object of scalars.
    pub fn fields_from_json(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<BTreeMap<String, FieldValue>, CoreError> {
        object
            .iter()
            .map(|(name, value)| Ok((name.clone(), FieldValue::from_json(name, value)?)))
            .collect()
    }

    /// Parse `{"schema_version", "issuer", "fields": {...}}`.
    ///
    /// Field errors name the offending field; float values are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CoreError> {
        let object = value.as_object().ok_or_else(|| CoreError::InvalidValue {
            field: "<credential>".to_string(),
            reason: "credential must be a JSON object".to_string(),
        })?;
        let text = |key: &str| -> Result<String, CoreError> {
            object
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| CoreError::MissingField(key.to_string()))
        };
        let fields = object
            .get("fields")
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| CoreError::MissingField("fields".to_string()))?;
        Ok(Self {
            schema_version: SchemaVersion::new(text("schema_version")?)?,
            issuer: IssuerId::new(text("issuer")?)?,
            fields: Self::fields_from_json(fields)?,
        })
    }

    /// Look up one field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Project the credential onto the ordering's leaf sequence.
    ///
    /// # Errors
    ///
    /// `MissingField` naming the first absent field.
    pub fn ordered_values(&self, ordering: &FieldOrdering) -> Result<Vec<FieldValue>, CoreError> {
        ordering
            .names()
            .iter()
            .map(|name| {
                self.fields
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CoreError::MissingField(name.clone()))
            })
            .collect()
    }
}
