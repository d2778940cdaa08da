//! Volatile in-memory engine.
//!
//! Used when the primary store is unreachable at startup, and by the test
//! suite. Contents live only as long as the process.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::core::{Backend, Key, StoreMode};
use crate::entity::EntityKind;
use crate::error::StoreResult;
use crate::query::{self, Query};

/// In-memory backend: one document vector per collection.
#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<EntityKind, Vec<Value>>>,
}

impl MemoryBackend {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_key(kind: EntityKind, key: &Key<'_>, doc: &Value) -> bool {
    match key {
        Key::No(no) => doc.get("no").and_then(Value::as_i64) == Some(*no),
        Key::Id(id) => doc.get("_id").and_then(Value::as_str) == Some(*id),
        Key::Code(code) => {
            doc.get(key.field(kind)).and_then(Value::as_str) == Some(*code)
        }
    }
}

fn is_soft_deleted(doc: &Value) -> bool {
    doc.get("isDeleted").and_then(Value::as_bool).unwrap_or(false)
}

#[async_trait]
impl Backend for MemoryBackend {
    fn mode(&self) -> StoreMode {
        StoreMode::Degraded
    }

    async fn find(&self, kind: EntityKind, query: &Query) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read();
        let mut hits: Vec<Value> = collections
            .get(&kind)
            .map(|docs| docs.iter().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default();
        query::sort_descending(&mut hits, kind.sort_fields());
        Ok(hits)
    }

    async fn find_one(
        &self,
        kind: EntityKind,
        key: &Key<'_>,
        include_deleted: bool,
    ) -> StoreResult<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections.get(&kind).and_then(|docs| {
            docs.iter()
                .find(|d| matches_key(kind, key, d) && (include_deleted || !is_soft_deleted(d)))
                .cloned()
        }))
    }

    async fn insert(&self, kind: EntityKind, doc: Value) -> StoreResult<Value> {
        let mut collections = self.collections.write();
        collections.entry(kind).or_default().push(doc.clone());
        Ok(doc)
    }

    async fn replace(
        &self,
        kind: EntityKind,
        key: &Key<'_>,
        doc: Value,
    ) -> StoreResult<Option<Value>> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(&kind) else {
            return Ok(None);
        };
        match docs.iter_mut().find(|d| matches_key(kind, key, d)) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, kind: EntityKind, key: &Key<'_>) -> StoreResult<Option<Value>> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(&kind) else {
            return Ok(None);
        };
        match docs.iter().position(|d| matches_key(kind, key, d)) {
            Some(index) => Ok(Some(docs.remove(index))),
            None => Ok(None),
        }
    }

    async fn max_no(&self, kind: EntityKind) -> StoreResult<Option<i64>> {
        let collections = self.collections.read();
        Ok(collections.get(&kind).and_then(|docs| {
            docs.iter()
                .filter_map(|d| d.get("no").and_then(Value::as_i64))
                .max()
        }))
    }

    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let collections = self.collections.read();
        Ok(collections.get(&kind).map(|docs| docs.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_sorts_newest_first() {
        let backend = MemoryBackend::new();
        for no in [2, 1, 3] {
            backend
                .insert(EntityKind::Voc, json!({"_id": no.to_string(), "no": no}))
                .await
                .unwrap();
        }
        let docs = backend.find(EntityKind::Voc, &Query::new()).await.unwrap();
        let nos: Vec<_> = docs.iter().map(|d| d["no"].as_i64().unwrap()).collect();
        assert_eq!(nos, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_find_one_skips_soft_deleted_by_default() {
        let backend = MemoryBackend::new();
        backend
            .insert(
                EntityKind::Software,
                json!({"_id": "a", "code": "SWM-2403-001", "isDeleted": true}),
            )
            .await
            .unwrap();
        let key = Key::Code("SWM-2403-001");
        assert!(backend
            .find_one(EntityKind::Software, &key, false)
            .await
            .unwrap()
            .is_none());
        assert!(backend
            .find_one(EntityKind::Software, &key, true)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_remove_returns_the_document() {
        let backend = MemoryBackend::new();
        backend
            .insert(EntityKind::Hardware, json!({"_id": "a", "no": 1}))
            .await
            .unwrap();
        let removed = backend
            .remove(EntityKind::Hardware, &Key::Id("a"))
            .await
            .unwrap();
        assert_eq!(removed.unwrap()["no"], 1);
        assert_eq!(backend.count(EntityKind::Hardware).await.unwrap(), 0);
        assert!(backend
            .remove(EntityKind::Hardware, &Key::Id("a"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_max_no_spans_deleted_documents() {
        let backend = MemoryBackend::new();
        backend
            .insert(EntityKind::Software, json!({"_id": "a", "no": 4, "isDeleted": true}))
            .await
            .unwrap();
        backend
            .insert(EntityKind::Software, json!({"_id": "b", "no": 2}))
            .await
            .unwrap();
        assert_eq!(backend.max_no(EntityKind::Software).await.unwrap(), Some(4));
        assert_eq!(backend.max_no(EntityKind::Voc).await.unwrap(), None);
    }
}
