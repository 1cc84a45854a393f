//! Store-side shapes shared by every [`crate::ObjectStore`] implementation.

use serde::{Deserialize, Serialize};

/// One `(key, value)` pair sent on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: String,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A media reference attached to a field, with the public URL the store
/// already had at query time (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub id: String,
    pub url: Option<String>,
}

/// A field as returned by a query: the raw string value plus any references
/// the store resolved alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub key: String,
    /// `None` when the field exists on the definition but was never written.
    pub value: Option<String>,
    pub references: Vec<ResolvedReference>,
}

/// A stored object exactly as the store returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: String,
    pub handle: String,
    pub fields: Vec<RawField>,
}

impl RawRecord {
    /// Looks up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&RawField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Returns a field's raw value, treating blank strings as absent.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.field(key)
            .and_then(|f| f.value.as_deref())
            .filter(|v| !v.trim().is_empty())
    }
}
