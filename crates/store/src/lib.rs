//! Dual-backend persistence layer for the Assetdesk API.
//!
//! The store keeps schemaless JSON documents in named collections with a
//! uniform write pipeline: validation, sequence allocation, deterministic
//! business-code generation, uniqueness enforcement and soft/hard delete
//! semantics. Two engines implement the same [`Backend`] contract:
//!
//! - [`backends::MongoBackend`]: the durable primary store;
//! - [`backends::MemoryBackend`]: a volatile fallback selected at startup
//!   when the primary is unreachable, and the engine the tests run on.
//!
//! [`connect::connect`] picks the engine once at startup; handlers only see
//! the [`DocumentStore`] trait and cannot tell the engines apart.

#![warn(missing_docs)]

pub mod backends;
pub mod blob;
pub mod codegen;
pub mod connect;
pub mod core;
pub mod entity;
pub mod error;
pub mod facade;
pub mod query;
pub mod seed;
pub mod time;

pub use backends::{MemoryBackend, MongoBackend};
pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use connect::{connect, ConnectOptions, SelectedStore};
pub use core::{Backend, DocumentStore, Key, StoreMode};
pub use entity::{DeleteMode, EntityKind};
pub use error::{StoreError, StoreResult};
pub use facade::Store;
pub use query::Query;
