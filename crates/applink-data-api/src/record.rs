//! Write-side and read-side record types.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde_json::{Number, Value};

use crate::reference_id::ReferenceId;

/// A single field value.
///
/// Write-side records use the scalar variants plus [`FieldValue::Binary`] and
/// [`FieldValue::Reference`]. Query results may also carry
/// [`FieldValue::Compound`] (address/location fields, parent relationships)
/// and [`FieldValue::List`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Binary(Bytes),
    Reference(ReferenceId),
    Compound(BTreeMap<String, FieldValue>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            FieldValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceId> {
        match self {
            FieldValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Compound(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                FieldValue::Compound(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64);

impl From<f64> for FieldValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(FieldValue::Null, FieldValue::Number)
    }
}

impl From<Bytes> for FieldValue {
    fn from(value: Bytes) -> Self {
        FieldValue::Binary(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Binary(Bytes::from(value))
    }
}

impl From<&[u8]> for FieldValue {
    fn from(value: &[u8]) -> Self {
        FieldValue::Binary(Bytes::copy_from_slice(value))
    }
}

impl From<ReferenceId> for FieldValue {
    fn from(value: ReferenceId) -> Self {
        FieldValue::Reference(value)
    }
}

impl From<&ReferenceId> for FieldValue {
    fn from(value: &ReferenceId) -> Self {
        FieldValue::Reference(value.clone())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// A record to create or update.
///
/// Updates require an `Id` field; it addresses the record and is never sent
/// in the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub sobject_type: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record of the given SObject type.
    pub fn new(sobject_type: impl Into<String>) -> Self {
        Self {
            sobject_type: sobject_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field (builder style).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The `Id` field, if present.
    pub fn id(&self) -> Option<&FieldValue> {
        self.fields.get("Id")
    }
}

/// One row of a query result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueriedRecord {
    pub sobject_type: String,
    pub fields: BTreeMap<String, FieldValue>,
    /// Relationship sub-queries keyed by relationship name.
    pub sub_query_results: BTreeMap<String, RecordQueryResult>,
}

impl QueriedRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn sub_query(&self, relationship_name: &str) -> Option<&RecordQueryResult> {
        self.sub_query_results.get(relationship_name)
    }
}

/// One page of a SOQL query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordQueryResult {
    pub done: bool,
    pub total_size: u64,
    pub records: Vec<QueriedRecord>,
    /// Opaque server cursor for the next page. Never constructed locally.
    pub next_records_url: Option<String>,
}

impl RecordQueryResult {
    /// Returns true if another page can be fetched with `query_more`.
    pub fn has_more(&self) -> bool {
        self.next_records_url.is_some()
    }
}
