//! Startup store selection.
//!
//! The server tries the primary MongoDB store a bounded number of times, then
//! falls back to the in-memory engine unless the database was declared
//! required. The decision is made once at startup; the process never switches
//! engines while running.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::Client;
use tracing::{info, warn};

use crate::backends::{MemoryBackend, MongoBackend};
use crate::core::StoreMode;
use crate::error::{StoreError, StoreResult};
use crate::facade::Store;
use crate::seed;

/// How to reach (or skip) the primary store.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// MongoDB connection string. `None` selects the in-memory engine
    /// without attempting a connection.
    pub uri: Option<String>,
    /// Database name on the primary store.
    pub db_name: String,
    /// Connection attempts before giving up.
    pub max_retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Fail startup instead of degrading when the primary is unreachable.
    pub require_database: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            uri: None,
            db_name: "assetdesk".to_string(),
            max_retries: 5,
            retry_delay: Duration::from_secs(2),
            require_database: false,
        }
    }
}

/// The store the server ended up with.
pub enum SelectedStore {
    /// Connected to MongoDB.
    Primary(Store<MongoBackend>),
    /// Degraded to the volatile in-memory engine.
    Memory(Store<MemoryBackend>),
}

impl SelectedStore {
    /// Which mode was selected.
    pub fn mode(&self) -> StoreMode {
        match self {
            SelectedStore::Primary(_) => StoreMode::Primary,
            SelectedStore::Memory(_) => StoreMode::Degraded,
        }
    }
}

/// Selects and initializes the store per the options.
///
/// Empty collections are seeded with sample fixtures on both engines, so a
/// fresh deployment has data to browse.
pub async fn connect(options: &ConnectOptions) -> StoreResult<SelectedStore> {
    if let Some(uri) = &options.uri {
        match try_primary(uri, options).await {
            Ok(store) => return Ok(SelectedStore::Primary(store)),
            Err(err) if options.require_database => return Err(err),
            Err(err) => {
                warn!(error = %err, "primary store unreachable, continuing on in-memory store");
            }
        }
    } else if options.require_database {
        return Err(StoreError::Unavailable {
            attempts: 0,
            message: "database required but no connection string configured".to_string(),
        });
    }

    let store = Store::new(MemoryBackend::new());
    seed::seed_empty_collections(&store).await?;
    info!("in-memory store ready (contents are volatile)");
    Ok(SelectedStore::Memory(store))
}

async fn try_primary(uri: &str, options: &ConnectOptions) -> StoreResult<Store<MongoBackend>> {
    let mut last_error = String::new();
    for attempt in 1..=options.max_retries {
        match ping(uri, &options.db_name).await {
            Ok(database) => {
                info!(db = %options.db_name, attempt, "connected to primary store");
                let backend = MongoBackend::new(database);
                backend.ensure_indexes().await?;
                let store = Store::new(backend);
                seed::seed_empty_collections(&store).await?;
                return Ok(store);
            }
            Err(err) => {
                warn!(
                    attempt,
                    max = options.max_retries,
                    error = %err,
                    "primary store connection failed"
                );
                last_error = err.to_string();
                if attempt < options.max_retries {
                    tokio::time::sleep(options.retry_delay).await;
                }
            }
        }
    }
    Err(StoreError::Unavailable {
        attempts: options.max_retries,
        message: last_error,
    })
}

async fn ping(uri: &str, db_name: &str) -> StoreResult<mongodb::Database> {
    let client = Client::with_uri_str(uri).await?;
    let database = client.database(db_name);
    database.run_command(doc! { "ping": 1 }).await?;
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DocumentStore;

    #[tokio::test]
    async fn test_no_uri_selects_memory_store() {
        let selected = connect(&ConnectOptions::default()).await.unwrap();
        assert_eq!(selected.mode(), StoreMode::Degraded);
        let SelectedStore::Memory(store) = selected else {
            panic!("expected the in-memory store");
        };
        // fixtures are loaded into the fresh store
        let count = store.count(crate::entity::EntityKind::Software).await.unwrap();
        assert!(count > 0);
    }

    #[tokio::test]
    async fn test_no_uri_with_required_database_fails() {
        let options = ConnectOptions {
            require_database: true,
            ..ConnectOptions::default()
        };
        let Err(err) = connect(&options).await else {
            panic!("expected startup to fail without a connection string");
        };
        assert!(matches!(err, StoreError::Unavailable { attempts: 0, .. }));
    }
}
