//! Shared test harness: an app over the in-memory engines.

use std::sync::Arc;

use axum_test::TestServer;

use assetdesk_rest::{create_app, ServerConfig};
use assetdesk_store::{MemoryBackend, MemoryBlobStore, Store};

/// Creates a test server over a fresh in-memory store.
pub fn test_server() -> TestServer {
    let store = Arc::new(Store::new(MemoryBackend::new()));
    let blobs = Arc::new(MemoryBlobStore::new());
    let app = create_app(store, blobs, ServerConfig::for_testing());
    TestServer::new(app).expect("failed to build test server")
}
