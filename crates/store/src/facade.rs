//! The write pipeline.
//!
//! [`Store`] wraps a [`Backend`] and layers the business rules on top:
//! defaults, validation, date normalization, sequence allocation, code
//! generation, uniqueness enforcement and delete semantics. Backends stay
//! dumb; swapping MongoDB for the in-memory engine changes durability, not
//! behavior.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::codegen::{generate_code, registration_date};
use crate::core::{Backend, DocumentStore, Key, StoreMode};
use crate::entity::{DeleteMode, EntityKind};
use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::time;

/// A document store built from a low-level backend.
pub struct Store<B> {
    backend: B,
    // Serializes sequence allocation per collection so concurrent inserts
    // cannot race to the same `no`.
    locks: HashMap<EntityKind, Mutex<()>>,
}

impl<B: Backend> Store<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        let locks = EntityKind::ALL
            .iter()
            .map(|kind| (*kind, Mutex::new(())))
            .collect();
        Self { backend, locks }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: Backend> DocumentStore for Store<B> {
    fn mode(&self) -> StoreMode {
        self.backend.mode()
    }

    async fn list(&self, kind: EntityKind, mut query: Query) -> StoreResult<Vec<Value>> {
        if kind.delete_mode() == DeleteMode::Soft {
            query.deleted = Some(false);
        }
        self.backend.find(kind, &query).await
    }

    async fn get(&self, kind: EntityKind, key: Key<'_>) -> StoreResult<Value> {
        self.backend
            .find_one(kind, &key, false)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: kind,
                key: key.display(),
            })
    }

    async fn insert(&self, kind: EntityKind, doc: Value) -> StoreResult<Value> {
        let mut fields = into_object(doc)?;
        mirror_flags(&mut fields);
        apply_defaults(kind, &mut fields);
        normalize_dates(kind, &mut fields);
        validate(kind, &fields)?;

        // Allocation and uniqueness must be atomic per collection.
        let _guard = self.locks[&kind].lock().await;

        if kind.has_sequence() && !has_value(&fields, "no") {
            let next = self.backend.max_no(kind).await?.unwrap_or(0) + 1;
            fields.insert("no".to_string(), Value::from(next));
        }

        if kind.generates_code() && !has_value(&fields, kind.code_field().unwrap_or_default()) {
            let no = fields.get("no").and_then(Value::as_i64).unwrap_or(1);
            let reg = registration_date(&Value::Object(fields.clone()));
            if let Some(code) = generate_code(kind, reg, no) {
                fields.insert(kind.code_field().unwrap_or_default().to_string(), code.into());
            }
        }

        if let Some(code_field) = kind.code_field() {
            if let Some(code) = fields.get(code_field).and_then(Value::as_str) {
                if !code.is_empty()
                    && self
                        .backend
                        .find_one(kind, &Key::Code(code), true)
                        .await?
                        .is_some()
                {
                    return Err(StoreError::DuplicateKey {
                        entity: kind,
                        key: code.to_string(),
                    });
                }
            }
        }

        if kind.unique_no() {
            if let Some(no) = fields.get("no").and_then(Value::as_i64) {
                if self
                    .backend
                    .find_one(kind, &Key::No(no), true)
                    .await?
                    .is_some()
                {
                    return Err(StoreError::DuplicateKey {
                        entity: kind,
                        key: no.to_string(),
                    });
                }
            }
        }

        let now = time::now();
        fields
            .entry("_id".to_string())
            .or_insert_with(|| Uuid::new_v4().to_string().into());
        fields.insert("createdAt".to_string(), now.clone().into());
        fields.insert("updatedAt".to_string(), now.into());
        if kind.tracks_status_flags() {
            fields
                .entry("saveStatus".to_string())
                .or_insert(Value::Bool(true));
            fields
                .entry("modifiedStatus".to_string())
                .or_insert(Value::Bool(false));
        }
        if kind.delete_mode() == DeleteMode::Soft {
            fields.insert("isDeleted".to_string(), Value::Bool(false));
        }

        self.backend.insert(kind, Value::Object(fields)).await
    }

    async fn update(&self, kind: EntityKind, key: Key<'_>, changes: Value) -> StoreResult<Value> {
        let existing = self.get(kind, key).await?;
        let mut changes = into_object(changes)?;
        mirror_flags(&mut changes);
        normalize_dates(kind, &mut changes);

        let mut merged = into_object(existing)?;
        let protected: &[&str] = &["_id", "no", "createdAt", "isDeleted"];
        for (field, value) in changes {
            if protected.contains(&field.as_str()) || Some(field.as_str()) == kind.code_field() {
                continue;
            }
            merged.insert(field, value);
        }
        merged.insert("updatedAt".to_string(), time::now().into());

        let id = merged
            .get("_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Backend {
                message: "stored document is missing _id".to_string(),
            })?;
        self.backend
            .replace(kind, &Key::Id(&id), Value::Object(merged))
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: kind,
                key: key.display(),
            })
    }

    async fn delete(&self, kind: EntityKind, key: Key<'_>) -> StoreResult<Value> {
        match kind.delete_mode() {
            DeleteMode::Hard => self
                .backend
                .remove(kind, &key)
                .await?
                .ok_or_else(|| StoreError::NotFound {
                    entity: kind,
                    key: key.display(),
                }),
            DeleteMode::Soft => {
                let existing = self.get(kind, key).await?;
                let mut fields = into_object(existing)?;
                fields.insert("isDeleted".to_string(), Value::Bool(true));
                fields.insert("updatedAt".to_string(), time::now().into());
                let id = fields
                    .get("_id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::Backend {
                        message: "stored document is missing _id".to_string(),
                    })?;
                self.backend
                    .replace(kind, &Key::Id(&id), Value::Object(fields))
                    .await?
                    .ok_or_else(|| StoreError::NotFound {
                        entity: kind,
                        key: key.display(),
                    })
            }
        }
    }

    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        self.backend.count(kind).await
    }
}

fn into_object(doc: Value) -> StoreResult<Map<String, Value>> {
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization {
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}

fn has_value(fields: &Map<String, Value>, field: &str) -> bool {
    match fields.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Folds the `isSaved`/`isModified` aliases into their stored counterparts.
fn mirror_flags(fields: &mut Map<String, Value>) {
    if let Some(saved) = fields.remove("isSaved") {
        fields.insert("saveStatus".to_string(), saved);
    }
    if let Some(modified) = fields.remove("isModified") {
        fields.insert("modifiedStatus".to_string(), modified);
    }
}

fn apply_defaults(kind: EntityKind, fields: &mut Map<String, Value>) {
    match kind {
        EntityKind::Hardware => {
            if !has_value(fields, "assetName") {
                fields.insert("assetName".to_string(), "미지정".into());
            }
        }
        EntityKind::Voc => {
            if !has_value(fields, "vocCategory") {
                fields.insert("vocCategory".to_string(), "MES 아산".into());
            }
            if !has_value(fields, "status") {
                fields.insert("status".to_string(), "접수".into());
            }
            if !has_value(fields, "requestType") {
                fields.insert("requestType".to_string(), "신규".into());
            }
            if !has_value(fields, "dueDate") {
                fields.insert("dueDate".to_string(), time::days_from_now(7).into());
            }
        }
        _ => {}
    }
    if kind.date_fields().contains(&"regDate") && !has_value(fields, "regDate") {
        fields.insert("regDate".to_string(), time::now().into());
    }
    if kind == EntityKind::Attachment && !has_value(fields, "uploadDate") {
        fields.insert("uploadDate".to_string(), time::now().into());
    }
}

fn normalize_dates(kind: EntityKind, fields: &mut Map<String, Value>) {
    for field in kind.date_fields() {
        let Some(raw) = fields.get(*field).and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        if raw.is_empty() {
            fields.remove(*field);
        } else if let Some(canonical) = time::normalize(&raw) {
            fields.insert((*field).to_string(), canonical.into());
        }
    }
}

fn validate(kind: EntityKind, fields: &Map<String, Value>) -> StoreResult<()> {
    let missing: Vec<String> = kind
        .required_fields()
        .iter()
        .filter(|field| !has_value(fields, field))
        .map(|field| (*field).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StoreError::Validation { fields: missing });
    }
    for (field, allowed) in kind.enum_fields() {
        if let Some(value) = fields.get(*field).and_then(Value::as_str) {
            if !value.is_empty() && !allowed.contains(&value) {
                return Err(StoreError::InvalidValue {
                    field: (*field).to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use serde_json::json;

    fn store() -> Store<MemoryBackend> {
        Store::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn test_insert_allocates_sequence_and_code() {
        let store = store();
        let doc = store
            .insert(
                EntityKind::Software,
                json!({
                    "assetType": "라이선스",
                    "assetName": "Office",
                    "costType": "구독",
                    "regDate": "2024-03-15"
                }),
            )
            .await
            .unwrap();
        assert_eq!(doc["no"], 1);
        assert_eq!(doc["code"], "SWM-2403-001");
        assert_eq!(doc["saveStatus"], true);
        assert_eq!(doc["modifiedStatus"], false);
        assert_eq!(doc["isDeleted"], false);
        assert_eq!(doc["regDate"], "2024-03-15T00:00:00.000Z");
        assert!(doc["_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn test_insert_rejects_missing_required_fields() {
        let store = store();
        let err = store
            .insert(
                EntityKind::SystemUpdate,
                json!({"targetSystem": "MES", "status": "진행중"}),
            )
            .await
            .unwrap_err();
        match err {
            StoreError::Validation { fields } => {
                assert_eq!(
                    fields,
                    vec!["description".to_string(), "updateType".to_string()]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_execution_type() {
        let store = store();
        let err = store
            .insert(
                EntityKind::Hardware,
                json!({"executionType": "대여", "assetName": "mouse"}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { ref field, .. } if field == "executionType"));
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let store = store();
        let base = json!({
            "assetType": "라이선스", "assetName": "Office", "costType": "구독",
            "regDate": "2024-03-15", "code": "SWM-2403-777"
        });
        store.insert(EntityKind::Software, base.clone()).await.unwrap();
        let err = store.insert(EntityKind::Software, base).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref key, .. } if key == "SWM-2403-777"));
    }

    #[tokio::test]
    async fn test_duplicate_no_rejected_for_unique_sequence_kinds() {
        let store = store();
        let base = json!({
            "vocCategory": "시스템", "requestType": "신규", "status": "접수", "no": 5
        });
        store.insert(EntityKind::Voc, base.clone()).await.unwrap();
        let err = store.insert(EntityKind::Voc, base).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref key, .. } if key == "5"));
    }

    #[tokio::test]
    async fn test_sequence_continues_past_soft_deletes() {
        let store = store();
        let doc = json!({
            "assetType": "라이선스", "assetName": "Office", "costType": "구독",
            "regDate": "2024-03-15"
        });
        let first = store.insert(EntityKind::Software, doc.clone()).await.unwrap();
        store
            .delete(EntityKind::Software, Key::Id(first["_id"].as_str().unwrap()))
            .await
            .unwrap();
        let second = store.insert(EntityKind::Software, doc).await.unwrap();
        assert_eq!(second["no"], 2);
        assert_eq!(second["code"], "SWM-2403-002");
    }

    #[tokio::test]
    async fn test_soft_delete_hides_but_keeps_document() {
        let store = store();
        let doc = store
            .insert(
                EntityKind::Software,
                json!({"assetType": "SW", "assetName": "Office", "costType": "구독"}),
            )
            .await
            .unwrap();
        let id = doc["_id"].as_str().unwrap().to_string();
        let deleted = store
            .delete(EntityKind::Software, Key::Id(&id))
            .await
            .unwrap();
        assert_eq!(deleted["isDeleted"], true);

        let listed = store.list(EntityKind::Software, Query::new()).await.unwrap();
        assert!(listed.is_empty());
        let err = store.get(EntityKind::Software, Key::Id(&id)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count(EntityKind::Software).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_hard_delete_returns_document() {
        let store = store();
        let doc = store
            .insert(
                EntityKind::Voc,
                json!({"vocCategory": "시스템", "requestType": "신규", "status": "접수"}),
            )
            .await
            .unwrap();
        let removed = store.delete(EntityKind::Voc, Key::No(1)).await.unwrap();
        assert_eq!(removed["_id"], doc["_id"]);
        assert_eq!(store.count(EntityKind::Voc).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_and_protects_keys() {
        let store = store();
        let doc = store
            .insert(
                EntityKind::Software,
                json!({"assetType": "SW", "assetName": "Office", "costType": "구독"}),
            )
            .await
            .unwrap();
        let updated = store
            .update(
                EntityKind::Software,
                Key::Code(doc["code"].as_str().unwrap()),
                json!({"assetName": "Office 2024", "code": "SWM-9999-999", "no": 99, "isModified": true}),
            )
            .await
            .unwrap();
        assert_eq!(updated["assetName"], "Office 2024");
        assert_eq!(updated["code"], doc["code"]);
        assert_eq!(updated["no"], 1);
        assert_eq!(updated["modifiedStatus"], true);
        assert_eq!(updated["createdAt"], doc["createdAt"]);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = store();
        let err = store
            .update(EntityKind::Hardware, Key::Code("HW000101-0001"), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_voc_defaults() {
        let store = store();
        let doc = store
            .insert(EntityKind::Voc, json!({"vocCategory": "시스템"}))
            .await
            .unwrap();
        assert_eq!(doc["status"], "접수");
        assert_eq!(doc["requestType"], "신규");
        assert!(doc["dueDate"].as_str().is_some());
        assert_eq!(doc["no"], 1);
        assert!(doc.get("code").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_sequences() {
        let store = std::sync::Arc::new(store());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(
                        EntityKind::Hardware,
                        json!({"executionType": "신규구매", "regDate": "2024-03-15"}),
                    )
                    .await
                    .unwrap()
            }));
        }
        let mut nos = Vec::new();
        for handle in handles {
            nos.push(handle.await.unwrap()["no"].as_i64().unwrap());
        }
        nos.sort_unstable();
        assert_eq!(nos, (1..=8).collect::<Vec<_>>());
    }
}
