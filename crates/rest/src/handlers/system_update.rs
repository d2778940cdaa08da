//! System update (solution development) log handlers.
//!
//! Addressable both by unique sequence number and by `updateCode`.

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

const KIND: EntityKind = EntityKind::SystemUpdate;

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
    target_system: Option<String>,
    update_type: Option<String>,
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn build_query(params: ListParams) -> Query {
    let (from, to) = range_bounds(params.start_date, params.end_date);
    Query::new()
        .with_search(params.search, KIND.search_fields())
        .with_exact("targetSystem", params.target_system)
        .with_exact("updateType", params.update_type)
        .with_exact("status", params.status)
        .with_range("regDate", from, to)
}

/// `GET /api/system-updates`
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

/// `GET /api/system-updates/{no}`
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

/// `GET /api/system-updates/code/{code}` (keyed on `updateCode`)
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

/// `POST /api/system-updates`
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<Value>,
) -> RestResult<(StatusCode, Json<Value>)> {
    let doc = state.store().insert(KIND, body).await.map_err(store_err)?;
    Ok((StatusCode::CREATED, Json(present(doc))))
}

/// `PUT /api/system-updates/{no}`
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

/// `PUT /api/system-updates/code/{code}`
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

/// `DELETE /api/system-updates/{no}` (hard)
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
        "message": "system update deleted",
        "deletedUpdate": present(doc),
    })))
}

/// `DELETE /api/system-updates/code/{code}` (hard)
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
        "message": "system update deleted",
        "deletedUpdate": present(doc),
    })))
}

/// Routes for this entity (mounted at `/api/system-updates` and the
/// `/api/solution-development` alias).
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
