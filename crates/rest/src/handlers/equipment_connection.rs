//! Equipment connection handlers (soft-deleting, like software).

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

const KIND: EntityKind = EntityKind::EquipmentConnection;

fn store_err(err: StoreError) -> RestError {
    RestError::from_store(KIND, err)
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    search: Option<String>,
    line: Option<String>,
    equipment: Option<String>,
    work_type: Option<String>,
    data_type: Option<String>,
    connection_type: Option<String>,
    status: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn build_query(params: ListParams) -> Query {
    let (from, to) = range_bounds(params.start_date, params.end_date);
    Query::new()
        .with_search(params.search, KIND.search_fields())
        .with_exact("line", params.line)
        .with_exact("equipment", params.equipment)
        .with_exact("workType", params.work_type)
        .with_exact("dataType", params.data_type)
        .with_exact("connectionType", params.connection_type)
        .with_exact("status", params.status)
        .with_range("regDate", from, to)
}

/// `GET /api/equipment-connections`
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

/// `GET /api/equipment-connections/code/{code}`
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

/// `POST /api/equipment-connections`
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<Value>,
) -> RestResult<(StatusCode, Json<Value>)> {
    let doc = state.store().insert(KIND, body).await.map_err(store_err)?;
    Ok((StatusCode::CREATED, Json(present(doc))))
}

/// `PUT /api/equipment-connections/code/{code}`
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

/// `DELETE /api/equipment-connections/code/{code}` (soft)
pub async fn delete_by_code<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(code): Path<String>,
) -> RestResult<Json<Value>> {
    state
        .store()
        .delete(KIND, Key::Code(&code))
        .await
        .map_err(store_err)?;
    Ok(Json(json!({ "message": "equipment connection deleted" })))
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
}
