//! MongoDB primary engine.
//!
//! Documents are stored as plain BSON with a string `_id`, so they round-trip
//! to JSON without extended-JSON artifacts. Unique indexes on the business
//! code and, where applicable, on `no` back up the store-level uniqueness
//! checks.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde_json::Value;

use crate::core::{Backend, Key, StoreMode};
use crate::entity::EntityKind;
use crate::error::{StoreError, StoreResult};
use crate::query::Query;

/// MongoDB backend over a connected database handle.
pub struct MongoBackend {
    database: Database,
}

impl MongoBackend {
    /// Wraps a connected database.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, kind: EntityKind) -> Collection<Document> {
        self.database.collection(kind.collection())
    }

    /// Creates the unique indexes backing code and sequence uniqueness.
    ///
    /// Sparse on the code field, so documents without a client-supplied code
    /// (VOC tickets) do not collide on a missing key.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        for kind in EntityKind::ALL {
            let collection = self.collection(kind);
            if let Some(code_field) = kind.code_field() {
                let index = IndexModel::builder()
                    .keys(doc! { code_field: 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .sparse(true)
                            .build(),
                    )
                    .build();
                collection.create_index(index).await?;
            }
            if kind.unique_no() {
                let index = IndexModel::builder()
                    .keys(doc! { "no": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .sparse(true)
                            .build(),
                    )
                    .build();
                collection.create_index(index).await?;
            }
        }
        Ok(())
    }
}

/// Translates a [`Query`] into a MongoDB filter document.
///
/// Must stay semantically aligned with [`Query::matches`]: substring matches
/// are case-insensitive anchored-nowhere regexes over escaped input, exact
/// and range filters are plain comparisons on the normalized strings.
pub fn mongo_filter(query: &Query) -> Document {
    let mut clauses: Vec<Document> = Vec::new();

    match query.deleted {
        Some(false) => clauses.push(doc! { "isDeleted": { "$ne": true } }),
        Some(true) => clauses.push(doc! { "isDeleted": true }),
        None => {}
    }

    for group in &query.groups {
        let alternatives: Vec<Document> = group
            .fields
            .iter()
            .map(|field| {
                doc! { *field: { "$regex": regex::escape(&group.term), "$options": "i" } }
            })
            .collect();
        clauses.push(doc! { "$or": alternatives });
    }

    for (field, term) in &query.substring {
        clauses.push(doc! { field: { "$regex": regex::escape(term), "$options": "i" } });
    }

    for (field, value) in &query.exact {
        clauses.push(doc! { field: value });
    }

    for range in &query.ranges {
        let mut bounds = Document::new();
        if let Some(from) = &range.from {
            bounds.insert("$gte", from);
        }
        if let Some(to) = &range.to {
            bounds.insert("$lte", to);
        }
        clauses.push(doc! { range.field: bounds });
    }

    match clauses.len() {
        0 => Document::new(),
        1 => clauses.into_iter().next().unwrap_or_default(),
        _ => doc! { "$and": clauses },
    }
}

fn key_filter(kind: EntityKind, key: &Key<'_>, include_deleted: bool) -> Document {
    let mut filter = match key {
        Key::Id(id) => doc! { "_id": *id },
        Key::Code(code) => doc! { key.field(kind): *code },
        Key::No(no) => doc! { "no": *no },
    };
    if !include_deleted {
        filter.insert("isDeleted", doc! { "$ne": true });
    }
    filter
}

fn sort_spec(kind: EntityKind) -> Document {
    let mut sort = Document::new();
    for field in kind.sort_fields() {
        sort.insert(*field, -1);
    }
    sort
}

fn to_bson(doc: &Value) -> StoreResult<Document> {
    mongodb::bson::to_document(doc).map_err(|err| StoreError::Serialization {
        message: err.to_string(),
    })
}

fn to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl Backend for MongoBackend {
    fn mode(&self) -> StoreMode {
        StoreMode::Primary
    }

    async fn find(&self, kind: EntityKind, query: &Query) -> StoreResult<Vec<Value>> {
        let cursor = self
            .collection(kind)
            .find(mongo_filter(query))
            .sort(sort_spec(kind))
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(to_json).collect())
    }

    async fn find_one(
        &self,
        kind: EntityKind,
        key: &Key<'_>,
        include_deleted: bool,
    ) -> StoreResult<Option<Value>> {
        let found = self
            .collection(kind)
            .find_one(key_filter(kind, key, include_deleted))
            .await?;
        Ok(found.map(to_json))
    }

    async fn insert(&self, kind: EntityKind, doc: Value) -> StoreResult<Value> {
        let bson = to_bson(&doc)?;
        match self.collection(kind).insert_one(bson).await {
            Ok(_) => Ok(doc),
            Err(err) if is_duplicate_key(&err) => {
                let key = kind
                    .code_field()
                    .and_then(|field| doc.get(field))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        doc.get("no").map(|no| no.to_string()).unwrap_or_default()
                    });
                Err(StoreError::DuplicateKey { entity: kind, key })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn replace(
        &self,
        kind: EntityKind,
        key: &Key<'_>,
        doc: Value,
    ) -> StoreResult<Option<Value>> {
        let replaced = self
            .collection(kind)
            .find_one_and_replace(key_filter(kind, key, true), to_bson(&doc)?)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(replaced.map(to_json))
    }

    async fn remove(&self, kind: EntityKind, key: &Key<'_>) -> StoreResult<Option<Value>> {
        let removed = self
            .collection(kind)
            .find_one_and_delete(key_filter(kind, key, true))
            .await?;
        Ok(removed.map(to_json))
    }

    async fn max_no(&self, kind: EntityKind) -> StoreResult<Option<i64>> {
        let top = self
            .collection(kind)
            .find_one(doc! { "no": { "$exists": true } })
            .sort(doc! { "no": -1 })
            .await?;
        Ok(top.and_then(|doc| match doc.get("no") {
            Some(Bson::Int64(no)) => Some(*no),
            Some(Bson::Int32(no)) => Some(i64::from(*no)),
            Some(Bson::Double(no)) => Some(*no as i64),
            _ => None,
        }))
    }

    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        Ok(self.collection(kind).count_documents(Document::new()).await?)
    }
}
