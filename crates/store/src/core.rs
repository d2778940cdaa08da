//! Core store abstractions.
//!
//! [`Backend`] is the low-level contract a storage engine implements: raw
//! collection reads and writes with no business rules. [`DocumentStore`] is
//! the high-level contract the REST layer consumes: the write pipeline
//! (validation, sequence allocation, code generation, uniqueness, status
//! flags) lives above the backend so every engine behaves identically.

use async_trait::async_trait;
use serde_json::Value;

use crate::entity::EntityKind;
use crate::error::StoreResult;
use crate::query::Query;

/// Which storage engine the server ended up running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Connected to the primary MongoDB store.
    Primary,
    /// Running on the volatile in-memory store.
    Degraded,
}

impl StoreMode {
    /// Wire representation used by the health endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Primary => "primary",
            StoreMode::Degraded => "memory",
        }
    }
}

/// A key addressing a single document.
#[derive(Debug, Clone, Copy)]
pub enum Key<'a> {
    /// The synthetic `_id`.
    Id(&'a str),
    /// The business code (`code` or `updateCode` per entity kind).
    Code(&'a str),
    /// The `no` sequence value.
    No(i64),
}

impl Key<'_> {
    /// The document field this key addresses for the given kind.
    ///
    /// # Panics
    ///
    /// Panics if [`Key::Code`] is used for a kind without a code field; the
    /// REST layer never routes code lookups to such kinds.
    pub fn field(&self, kind: EntityKind) -> &'static str {
        match self {
            Key::Id(_) => "_id",
            Key::No(_) => "no",
            Key::Code(_) => kind
                .code_field()
                .unwrap_or_else(|| panic!("{kind} has no code field")),
        }
    }

    /// The key as a JSON value, for equality matching.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Id(id) => Value::String((*id).to_string()),
            Key::Code(code) => Value::String((*code).to_string()),
            Key::No(no) => Value::from(*no),
        }
    }

    /// Human-readable form for error messages.
    pub fn display(&self) -> String {
        match self {
            Key::Id(id) => (*id).to_string(),
            Key::Code(code) => (*code).to_string(),
            Key::No(no) => no.to_string(),
        }
    }
}

/// Low-level storage engine contract.
///
/// Implementations perform raw reads and writes only. List results come back
/// already sorted by the kind's sort fields, descending.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which mode this backend represents.
    fn mode(&self) -> StoreMode;

    /// Returns all documents matching the query, sorted.
    async fn find(&self, kind: EntityKind, query: &Query) -> StoreResult<Vec<Value>>;

    /// Returns the first document matching the key, if any.
    ///
    /// Soft-deleted documents are skipped unless `include_deleted` is set.
    async fn find_one(
        &self,
        kind: EntityKind,
        key: &Key<'_>,
        include_deleted: bool,
    ) -> StoreResult<Option<Value>>;

    /// Inserts a fully prepared document.
    async fn insert(&self, kind: EntityKind, doc: Value) -> StoreResult<Value>;

    /// Replaces the document matching the key, returning the new version.
    async fn replace(
        &self,
        kind: EntityKind,
        key: &Key<'_>,
        doc: Value,
    ) -> StoreResult<Option<Value>>;

    /// Removes the document matching the key, returning it.
    async fn remove(&self, kind: EntityKind, key: &Key<'_>) -> StoreResult<Option<Value>>;

    /// Highest `no` currently present in the collection, deleted rows included.
    async fn max_no(&self, kind: EntityKind) -> StoreResult<Option<i64>>;

    /// Number of documents in the collection, deleted rows included.
    async fn count(&self, kind: EntityKind) -> StoreResult<u64>;
}

/// High-level document store consumed by the REST handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Which storage engine is in use.
    fn mode(&self) -> StoreMode;

    /// Lists documents matching the query, newest first.
    ///
    /// Soft-deleted documents are excluded for kinds that soft delete.
    async fn list(&self, kind: EntityKind, query: Query) -> StoreResult<Vec<Value>>;

    /// Fetches a single document by key.
    async fn get(&self, kind: EntityKind, key: Key<'_>) -> StoreResult<Value>;

    /// Runs the full insert pipeline and returns the stored document.
    async fn insert(&self, kind: EntityKind, doc: Value) -> StoreResult<Value>;

    /// Applies an update to the document matching the key.
    async fn update(&self, kind: EntityKind, key: Key<'_>, changes: Value) -> StoreResult<Value>;

    /// Deletes (hard or soft, per kind) and returns the affected document.
    async fn delete(&self, kind: EntityKind, key: Key<'_>) -> StoreResult<Value>;

    /// Number of documents in the collection.
    async fn count(&self, kind: EntityKind) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_fields() {
        assert_eq!(Key::Id("x").field(EntityKind::Voc), "_id");
        assert_eq!(Key::No(3).field(EntityKind::Voc), "no");
        assert_eq!(Key::Code("SWM-2403-001").field(EntityKind::Software), "code");
        assert_eq!(
            Key::Code("UPD2403001").field(EntityKind::SystemUpdate),
            "updateCode"
        );
    }

    #[test]
    fn test_key_values() {
        assert_eq!(Key::No(7).to_value(), Value::from(7));
        assert_eq!(Key::Id("abc").to_value(), Value::from("abc"));
    }

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(StoreMode::Primary.as_str(), "primary");
        assert_eq!(StoreMode::Degraded.as_str(), "memory");
    }
}
