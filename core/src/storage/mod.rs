mod blob_store;
mod database;

pub use blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use database::{Connection, Database};

/// Blob key holding the serialized forest
pub const FOREST_KEY: &str = "notes";

/// Blob key owned by the task-list collaborator. The note store never touches it.
pub const TASKS_KEY: &str = "tasks";
