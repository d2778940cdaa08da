//! Shared application state.

use std::sync::Arc;

use assetdesk_store::{BlobStore, DocumentStore};

use crate::config::ServerConfig;

/// State available to every handler: the selected document store, the blob
/// store for attachment payloads, and the server configuration.
pub struct AppState<S> {
    store: Arc<S>,
    blobs: Arc<dyn BlobStore>,
    config: Arc<ServerConfig>,
}

// Manual Clone: S itself does not need to be Clone behind the Arc.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            blobs: Arc::clone(&self.blobs),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Creates the state.
    pub fn new(store: Arc<S>, blobs: Arc<dyn BlobStore>, config: ServerConfig) -> Self {
        Self {
            store,
            blobs,
            config: Arc::new(config),
        }
    }

    /// The document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The blob store.
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
