//! # Field Values
//!
//! A credential field is a string, a calendar date, an integer or a boolean.
//! Each renders to exactly one canonical string, and that string (UTF-8) is
//! what the leaf hash covers:
//!
//! | Variant   | Canonical string          |
//! |-----------|---------------------------|
//! | `Text`    | the string, unchanged     |
//! | `Date`    | `YYYY-MM-DD`              |
//! | `Integer` | base-10, `-` if negative  |
//! | `Boolean` | `true` / `false`          |
//!
//! Floats, nulls, arrays and objects are rejected. A date supplied as the
//! string `"2000-01-01"` and as `Date(2000-01-01)` hash identically.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;

/// The value of one credential field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// Calendar date (no time component).
    Date(NaiveDate),
    /// Signed integer.
    Integer(i64),
    /// Boolean flag.
    Boolean(bool),
}

impl FieldValue {
    /// Convenience constructor for text values.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Render the canonical string hashed into the leaf.
    pub fn canonical_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }

    /// Convert a JSON scalar into a field value.
    ///
    /// `field` is used only for error context.
    pub fn from_json(field: &str, value: &Value) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None if n.is_u64() => Err(invalid("integer exceeds i64 range")),
                None => Err(invalid("floats are not permitted; use a string or integer")),
            },
            Value::Null => Err(invalid("null is not a field value")),
            Value::Array(_) => Err(invalid("arrays are not field values")),
            Value::Object(_) => Err(invalid("objects are not field values")),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Text(_) | Self::Date(_) => serializer.serialize_str(&self.canonical_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json("<value>", &value).map_err(serde::de::Error::custom)
    }
}
