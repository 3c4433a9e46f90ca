//! Placeholder identifiers for records that do not exist yet.

use std::fmt;

const REFERENCE_ID_PREFIX: &str = "referenceId";

/// Identifies a not-yet-persisted record inside one [`UnitOfWork`](crate::UnitOfWork).
///
/// Dependent records embed it as `@{<id>.id}`; the server substitutes the
/// created record's Id when the composite graph runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId {
    id: String,
}

impl ReferenceId {
    /// Wrap an existing reference id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Mint a fresh id. Server reference ids must be alphanumeric, so the
    /// UUID is rendered without hyphens.
    pub(crate) fn generate() -> Self {
        Self::new(format!(
            "{}{}",
            REFERENCE_ID_PREFIX,
            uuid::Uuid::new_v4().simple()
        ))
    }

    /// The raw id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `@{<id>.id}` form substituted by the server.
    pub fn placeholder(&self) -> String {
        format!("@{{{}.id}}", self.id)
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
