//! Attachment payload storage.
//!
//! Attachment metadata lives in the document store; the bytes themselves go
//! through a [`BlobStore`]. The filesystem implementation backs production,
//! the in-memory one backs tests and keeps degraded mode self-contained.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Binary payload storage keyed by server-generated file names.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores a payload and returns its generated storage name.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> StoreResult<String>;

    /// Reads a payload back.
    async fn read(&self, name: &str) -> StoreResult<Vec<u8>>;

    /// Removes a payload. Removing an unknown name is not an error.
    async fn delete(&self, name: &str) -> StoreResult<()>;

    /// Whether a payload with this name exists.
    async fn exists(&self, name: &str) -> bool;
}

/// Keeps the client file name recognizable while guaranteeing uniqueness and
/// stripping anything path-like. Every name this returns passes
/// [`check_name`], so a saved blob can always be read back.
fn storage_name(original_name: &str) -> String {
    let mut safe = String::with_capacity(original_name.len());
    for c in original_name.chars() {
        let c = if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
            c
        } else {
            '_'
        };
        // squeeze dot runs so the name never contains ".."
        if c == '.' && safe.ends_with('.') {
            continue;
        }
        safe.push(c);
    }
    format!("{}_{safe}", Uuid::new_v4())
}

fn check_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name.contains('/') || name.contains("..") || name.contains('\\') {
        return Err(StoreError::Backend {
            message: format!("invalid blob name: {name}"),
        });
    }
    Ok(())
}

/// Blob store on the local filesystem (the `uploads/` directory).
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> StoreResult<String> {
        let name = storage_name(original_name);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), bytes).await?;
        Ok(name)
    }

    async fn read(&self, name: &str) -> StoreResult<Vec<u8>> {
        check_name(name)?;
        Ok(tokio::fs::read(self.root.join(name)).await?)
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        check_name(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && tokio::fs::try_exists(self.root.join(name)).await.unwrap_or(false)
    }
}

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> StoreResult<String> {
        let name = storage_name(original_name);
        self.blobs.write().insert(name.clone(), bytes.to_vec());
        Ok(name)
    }

    async fn read(&self, name: &str) -> StoreResult<Vec<u8>> {
        check_name(name)?;
        self.blobs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::Backend {
                message: format!("blob not found: {name}"),
            })
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        check_name(name)?;
        self.blobs.write().remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> bool {
        self.blobs.read().contains_key(name)
    }
}
