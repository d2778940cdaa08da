//! Assetdesk server.
//!
//! Internal IT asset / helpdesk tracking API: software and hardware assets,
//! VOC tickets, system update logs, equipment connections, attachments.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use assetdesk_rest::{create_app, init_logging, ServerConfig};
use assetdesk_store::{
    connect, BlobStore, ConnectOptions, DocumentStore, FsBlobStore, SelectedStore,
};

/// Starts the axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    info!(address = %addr, "server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn start<S>(store: S, config: ServerConfig) -> anyhow::Result<()>
where
    S: DocumentStore + 'static,
{
    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.upload_dir));
    let app = create_app(Arc::new(store), blobs, config.clone());
    serve(app, &config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    info!(
        port = config.port,
        host = %config.host,
        database = config.database_url.is_some(),
        "starting assetdesk"
    );

    let options = ConnectOptions {
        uri: config.database_url.clone(),
        db_name: config.db_name.clone(),
        require_database: config.require_database,
        ..ConnectOptions::default()
    };

    match connect(&options).await? {
        SelectedStore::Primary(store) => {
            info!(db = %config.db_name, "serving from the primary store");
            start(store, config).await
        }
        SelectedStore::Memory(store) => {
            warn!("serving from the in-memory store; data will not survive a restart");
            start(store, config).await
        }
    }
}
