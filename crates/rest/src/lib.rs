//! # assetdesk-rest — REST API for internal IT asset and helpdesk tracking
//!
//! This crate provides the HTTP layer of the Assetdesk service: CRUD
//! endpoints for software and hardware assets, VOC helpdesk tickets, system
//! update logs, equipment connection projects and file attachments.
//!
//! ## Endpoints
//!
//! | Entity | Base path | Keyed by |
//! |--------|-----------|----------|
//! | Software | `/api/software` | `code` |
//! | Hardware | `/api/hardware` (+ `/api/hardware-assets`) | `code` |
//! | VOC | `/api/voc` | `no` or `code` |
//! | System update | `/api/system-updates` (+ `/api/solution-development`) | `no` or `updateCode` |
//! | Equipment connection | `/api/equipment-connections` | `code` |
//! | Attachment | `/api/attachments` | `_id` |
//!
//! Every entity supports `GET` (filtered list), `POST` (create with
//! server-side sequence/code assignment), `PUT` and `DELETE`. Software and
//! equipment connections soft-delete; the rest delete physically. `GET
//! /health` reports which storage engine the process is running on.
//!
//! ## Architecture
//!
//! - [`config`] — clap-derived server configuration with env fallbacks
//! - [`error`] — error mapping to `{ "message": ... }` JSON responses
//! - [`state`] — shared application state (store, blob store, config)
//! - [`handlers`] — one handler module per entity
//! - [`routing`] — the route table
//!
//! Handlers are generic over [`assetdesk_store::DocumentStore`], so the same
//! application serves MongoDB and the in-memory fallback, and tests run
//! against the in-memory engine without a database.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routing;
pub mod state;

pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use assetdesk_store::{BlobStore, DocumentStore};

/// Creates the axum application.
///
/// # Arguments
///
/// * `store` - The selected document store
/// * `blobs` - Attachment payload storage
/// * `config` - Server configuration
pub fn create_app<S>(store: Arc<S>, blobs: Arc<dyn BlobStore>, config: ServerConfig) -> Router
where
    S: DocumentStore + 'static,
{
    let state = AppState::new(store, blobs, config.clone());
    let router = routing::create_routes(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size));

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.layer(service_builder)
}

/// Initializes the tracing subscriber. Call once at startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "assetdesk_rest={level},assetdesk_store={level},tower_http=warn"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
