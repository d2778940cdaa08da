//! Storage engines.

mod memory;
mod mongo;

pub use memory::MemoryBackend;
pub use mongo::MongoBackend;
