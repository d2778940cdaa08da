//! Hardware asset handlers.
//!
//! Hard-deleting entity; DELETE returns the removed document. Duplicate
//! codes surface as 400 here, not 409 (legacy client contract).

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

const KIND: EntityKind = EntityKind::Hardware;

fn store_err(err: StoreError) -> RestError {
    RestError::from_store(KIND, err)
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    search: Option<String>,
    asset_code: Option<String>,
    serial_number: Option<String>,
    current_user: Option<String>,
    asset_type: Option<String>,
    asset_name: Option<String>,
    execution_type: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

fn build_query(params: ListParams) -> Query {
    let (from, to) = range_bounds(params.start_date, params.end_date);
    Query::new()
        .with_search(params.search, KIND.search_fields())
        .with_substring("assetCode", params.asset_code)
        .with_substring("serialNumber", params.serial_number)
        .with_substring("currentUser", params.current_user)
        .with_exact("assetType", params.asset_type)
        .with_exact("assetName", params.asset_name)
        .with_exact("executionType", params.execution_type)
        .with_range("regDate", from, to)
}

/// `GET /api/hardware`
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

/// `GET /api/hardware/code/{code}`
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

/// `POST /api/hardware`
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Json(body): Json<Value>,
) -> RestResult<(StatusCode, Json<Value>)> {
    let doc = state.store().insert(KIND, body).await.map_err(store_err)?;
    Ok((StatusCode::CREATED, Json(present(doc))))
}

/// `PUT /api/hardware/code/{code}`
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

/// `DELETE /api/hardware/code/{code}` (hard)
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
        "message": "hardware deleted",
        "deletedHardware": present(doc),
    })))
}

/// Routes for this entity (mounted at `/api/hardware` and the
/// `/api/hardware-assets` alias).
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
