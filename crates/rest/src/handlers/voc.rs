//! VOC (voice of customer) ticket handlers.
//!
//! Tickets are addressed primarily by their unique sequence number; a
//! client-supplied code is accepted as an alternate key. The list endpoint
//! carries two free-text terms: `search` over the requester-facing fields
//! and `detailSearch` over request/action bodies, AND-ed together.

use axum::extract::{Path, Query as QueryParams, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use assetdesk_store::{DocumentStore, EntityKind, Key, Query, StoreError};

use super::{present, present_all, range_bounds};
use crate::error::{RestError, RestResult};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Voc;

const DETAIL_FIELDS: &[&str] = &["request", "action"];

fn store_err(err: StoreError) -> RestError {
    RestError::from_store(KIND, err)
}

fn parse_no(raw: &str) -> RestResult<i64> {
    raw.parse()
        .map_err(|_| RestError::bad_request(format!("invalid sequence number: {raw}")))
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    search: Option<String>,
    detail_search: Option<String>,
    voc_category: Option<String>,
    request_type: Option<String>,
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    due_date_start: Option<String>,
    due_date_end: Option<String>,
}

fn build_query(params: ListParams) -> Query {
    let (reg_from, reg_to) = range_bounds(params.start_date, params.end_date);
    let (due_from, due_to) = range_bounds(params.due_date_start, params.due_date_end);
    Query::new()
        .with_search(params.search, KIND.search_fields())
        .with_search(params.detail_search, DETAIL_FIELDS)
        .with_exact("vocCategory", params.voc_category)
        .with_exact("requestType", params.request_type)
        .with_exact("status", params.status)
        .with_range("regDate", reg_from, reg_to)
        .with_range("dueDate", due_from, due_to)
}

/// `GET /api/voc`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
    QueryParams(params): QueryParams<ListParams>,
) -> RestResult<Json<Value>> {
    let docs = state
        .store()
        .list(KIND, build_query(params))
        .await
        .map_err(store_err)?;
    Ok(Json(Value::Array(present_all(docs))))
}

/// `GET /api/voc/{no}`
pub async fn get_by_no<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(no): Path<String>,
) -> RestResult<Json<Value>> {
    let no = parse_no(&no)?;
    let doc = state
        .store()
        .get(KIND, Key::No(no))
        .await
        .map_err(store_err)?;
    Ok(Json(present(doc)))
}

/// `GET /api/voc/code/{code}`
pub async fn get_by_code<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(code): Path<String>,
) -> RestResult<Json<Value>> {
    let doc = state
        .store()
        .get(KIND, Key::Code(&code))
        .await
        .map_err(store_err)?;
    Ok(Json(present(doc)))
}

/// `POST /api/voc`
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<Value>,
) -> RestResult<(StatusCode, Json<Value>)> {
    let doc = state.store().insert(KIND, body).await.map_err(store_err)?;
    Ok((StatusCode::CREATED, Json(present(doc))))
}

/// `PUT /api/voc/{no}`
pub async fn update_by_no<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(no): Path<String>,
    Json(body): Json<Value>,
) -> RestResult<Json<Value>> {
    let no = parse_no(&no)?;
    let doc = state
        .store()
        .update(KIND, Key::No(no), body)
        .await
        .map_err(store_err)?;
    Ok(Json(present(doc)))
}

/// `PUT /api/voc/code/{code}`
pub async fn update_by_code<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(code): Path<String>,
    Json(body): Json<Value>,
) -> RestResult<Json<Value>> {
    let doc = state
        .store()
        .update(KIND, Key::Code(&code), body)
        .await
        .map_err(store_err)?;
    Ok(Json(present(doc)))
}

/// `DELETE /api/voc/{no}` (hard)
pub async fn delete_by_no<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(no): Path<String>,
) -> RestResult<Json<Value>> {
    let no = parse_no(&no)?;
    let doc = state
        .store()
        .delete(KIND, Key::No(no))
        .await
        .map_err(store_err)?;
    Ok(Json(json!({
        "message": "voc deleted",
        "deletedVoc": present(doc),
    })))
}

/// `DELETE /api/voc/code/{code}` (hard)
pub async fn delete_by_code<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(code): Path<String>,
) -> RestResult<Json<Value>> {
    let doc = state
        .store()
        .delete(KIND, Key::Code(&code))
        .await
        .map_err(store_err)?;
    Ok(Json(json!({
        "message": "voc deleted",
        "deletedVoc": present(doc),
    })))
}

/// Routes for this entity.
pub fn routes<S: DocumentStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(list::<S>).post(create::<S>))
        .route(
            "/code/{code}",
            get(get_by_code::<S>)
                .put(update_by_code::<S>)
                .delete(delete_by_code::<S>),
        )
        .route(
            "/{no}",
            get(get_by_no::<S>)
                .put(update_by_no::<S>)
                .delete(delete_by_no::<S>),
        )
}
