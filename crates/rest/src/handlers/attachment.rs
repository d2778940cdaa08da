//! Attachment handlers.
//!
//! Metadata lives in the document store, payloads in the blob store. The
//! two are not transactional: an upload removes its blob again when the
//! metadata insert fails, and a delete keeps going when the blob is already
//! gone.

use axum::extract::{Multipart, Path, Query as QueryParams, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use assetdesk_store::{DocumentStore, EntityKind, Key, Query, StoreError};

use crate::error::{RestError, RestResult};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Attachment;

fn store_err(err: StoreError) -> RestError {
    RestError::from_store(KIND, err)
}

/// Query parameters for the list endpoint; both are mandatory.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    related_entity_id: Option<String>,
    related_entity_type: Option<String>,
}

/// `GET /api/attachments?relatedEntityId=..&relatedEntityType=..`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
    QueryParams(params): QueryParams<ListParams>,
) -> RestResult<Json<Value>> {
    let (Some(entity_id), Some(entity_type)) =
        (params.related_entity_id, params.related_entity_type)
    else {
        return Err(RestError::bad_request(
            "relatedEntityId and relatedEntityType are required",
        ));
    };
    let query = Query::new()
        .with_exact("relatedEntityId", Some(entity_id))
        .with_exact("relatedEntityType", Some(entity_type));
    let docs = state.store().list(KIND, query).await.map_err(store_err)?;
    Ok(Json(Value::Array(docs)))
}

/// `POST /api/attachments` — multipart upload.
///
/// Expects a `file` part plus `relatedEntityId` and `relatedEntityType`
/// text parts.
pub async fn upload<S: DocumentStore>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> RestResult<(StatusCode, Json<Value>)> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut entity_id: Option<String> = None;
    let mut entity_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| RestError::bad_request(format!("malformed multipart body: {err}")))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("file").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
                    .to_string();
                let bytes = field.bytes().await.map_err(|err| {
                    RestError::bad_request(format!("failed to read file part: {err}"))
                })?;
                file = Some((name, mime, bytes.to_vec()));
            }
            Some("relatedEntityId") => {
                entity_id = field.text().await.ok().filter(|v| !v.is_empty());
            }
            Some("relatedEntityType") => {
                entity_type = field.text().await.ok().filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    let (original_name, mime_type, bytes) =
        file.ok_or_else(|| RestError::bad_request("file part is required"))?;
    let entity_id = entity_id
        .ok_or_else(|| RestError::bad_request("relatedEntityId is required"))?;
    let entity_type = entity_type
        .ok_or_else(|| RestError::bad_request("relatedEntityType is required"))?;

    let stored_name = state
        .blobs()
        .save(&original_name, &bytes)
        .await
        .map_err(store_err)?;

    let metadata = json!({
        "fileName": stored_name,
        "originalFilename": original_name,
        "mimeType": mime_type,
        "size": bytes.len(),
        "path": format!("{}/{}", state.config().upload_dir, stored_name),
        "relatedEntityId": entity_id,
        "relatedEntityType": entity_type,
    });

    match state.store().insert(KIND, metadata).await {
        Ok(doc) => Ok((StatusCode::CREATED, Json(doc))),
        Err(err) => {
            // the payload must not outlive its metadata
            if let Err(blob_err) = state.blobs().delete(&stored_name).await {
                warn!(error = %blob_err, file = %stored_name, "orphaned upload cleanup failed");
            }
            Err(store_err(err))
        }
    }
}

/// `GET /api/attachments/{id}/download`
pub async fn download<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response> {
    let metadata = state
        .store()
        .get(KIND, Key::Id(&id))
        .await
        .map_err(store_err)?;
    let stored_name = metadata
        .get("fileName")
        .and_then(Value::as_str)
        .ok_or_else(|| RestError::Internal {
            detail: format!("attachment {id} has no stored file name"),
        })?;
    if !state.blobs().exists(stored_name).await {
        return Err(RestError::NotFound {
            message: format!("attachment payload not found: {id}"),
        });
    }
    let bytes = state.blobs().read(stored_name).await.map_err(store_err)?;

    let content_type = metadata
        .get("mimeType")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<mime::Mime>().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
    let original = metadata
        .get("originalFilename")
        .and_then(Value::as_str)
        .unwrap_or("file");
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(original, NON_ALPHANUMERIC)
    );

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type.as_ref())
                .unwrap_or(HeaderValue::from_static("application/octet-stream")),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .unwrap_or(HeaderValue::from_static("attachment")),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// `DELETE /api/attachments/{id}`
pub async fn remove<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Json<Value>> {
    let metadata = state
        .store()
        .get(KIND, Key::Id(&id))
        .await
        .map_err(store_err)?;
    if let Some(stored_name) = metadata.get("fileName").and_then(Value::as_str) {
        if let Err(err) = state.blobs().delete(stored_name).await {
            warn!(error = %err, file = %stored_name, "attachment payload delete failed");
        }
    }
    let doc = state
        .store()
        .delete(KIND, Key::Id(&id))
        .await
        .map_err(store_err)?;
    Ok(Json(json!({
        "message": "attachment deleted",
        "deletedAttachment": doc,
    })))
}

/// Routes for this entity.
pub fn routes<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(list::<S>).post(upload::<S>))
        .route("/{id}/download", get(download::<S>))
        .route("/{id}", delete(remove::<S>))
}
