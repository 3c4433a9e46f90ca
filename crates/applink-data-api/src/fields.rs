//! Field normalization for request bodies and binary-field detection for
//! query results.

use std::collections::{BTreeMap, HashMap, HashSet};

use base64::Engine;
use serde_json::{Map, Value};

use crate::record::FieldValue;

/// `(SObject type, field)` pairs whose query value is a URL to the content
/// rather than the content itself.
pub const DEFAULT_BINARY_FIELDS: &[(&str, &str)] = &[
    ("ContentVersion", "VersionData"),
    ("Attachment", "Body"),
    ("Document", "Body"),
    ("StaticResource", "Body"),
    ("ContentNote", "Content"),
];

/// Convert a field value into its REST request representation.
pub fn normalize_field_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Number(n) => Value::Number(n.clone()),
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Binary(bytes) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        FieldValue::Reference(reference_id) => Value::String(reference_id.placeholder()),
        FieldValue::Compound(map) => Value::Object(normalize_record_fields(map)),
        FieldValue::List(items) => Value::Array(items.iter().map(normalize_field_value).collect()),
    }
}

/// Normalize every entry of a field map into a JSON object.
pub fn normalize_record_fields(fields: &BTreeMap<String, FieldValue>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), normalize_field_value(value)))
        .collect()
}

/// Returns true if `field_name` on `object_type` is a binary field in the
/// default allow-list.
pub fn is_binary_field(object_type: &str, field_name: &str) -> bool {
    DEFAULT_BINARY_FIELDS
        .iter()
        .any(|(t, f)| *t == object_type && *f == field_name)
}

/// Set of binary fields consulted while parsing query results.
///
/// `BinaryFields::default()` is [`DEFAULT_BINARY_FIELDS`]; extend it for
/// custom objects that expose content through a blob URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFields {
    by_type: HashMap<String, HashSet<String>>,
}

impl Default for BinaryFields {
    fn default() -> Self {
        DEFAULT_BINARY_FIELDS
            .iter()
            .fold(Self::none(), |fields, (t, f)| fields.with_field(*t, *f))
    }
}

impl BinaryFields {
    /// An empty set: no field is ever downloaded.
    pub fn none() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, object_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        self.by_type
            .entry(object_type.into())
            .or_default()
            .insert(field_name.into());
        self
    }

    pub fn contains(&self, object_type: &str, field_name: &str) -> bool {
        self.by_type
            .get(object_type)
            .is_some_and(|fields| fields.contains(field_name))
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
