//! Route configuration.
//!
//! All entity routes live under `/api`. Two legacy aliases are kept:
//! `/api/hardware-assets` for `/api/hardware` and `/api/solution-development`
//! for `/api/system-updates`.

use axum::routing::get;
use axum::Router;

use assetdesk_store::DocumentStore;

use crate::handlers;
use crate::state::AppState;

/// Creates the full route table.
///
/// ## Per entity
/// - `GET /` — filtered list
/// - `POST /` — create
/// - `GET|PUT|DELETE /code/{code}` — keyed by business code
/// - `GET|PUT|DELETE /{no}` — keyed by sequence (VOC and system updates)
///
/// ## Attachments
/// - `POST /` — multipart upload
/// - `GET /` — list for a related entity
/// - `GET /{id}/download`, `DELETE /{id}`
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::<S>))
        .nest("/api/software", handlers::software::routes())
        .nest("/api/hardware", handlers::hardware::routes())
        .nest("/api/hardware-assets", handlers::hardware::routes())
        .nest("/api/voc", handlers::voc::routes())
        .nest("/api/system-updates", handlers::system_update::routes())
        .nest("/api/solution-development", handlers::system_update::routes())
        .nest(
            "/api/equipment-connections",
            handlers::equipment_connection::routes(),
        )
        .nest("/api/attachments", handlers::attachment::routes())
        .with_state(state)
}
