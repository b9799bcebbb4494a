//! Path-addressed hierarchical note store with substring search and tabs.
//!
//! The [`workspace::Workspace`] owns one [`tree::NoteTree`], one [`tabs::TabManager`] and one
//! [`search::SearchSession`]; front ends drive everything through it.

pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod storage;
pub mod tabs;
pub mod tree;
pub mod workspace;

pub use error::{Error, Result};
pub use logging::{default_log_level, init_logging, logging_status};
pub use models::{Note, NotePath, MAX_DEPTH};
pub use search::{gather_all, search, SearchHit, SearchSession};
pub use storage::{BlobStore, MemoryBlobStore, SqliteBlobStore, FOREST_KEY};
pub use tabs::{Tab, TabManager};
pub use tree::{Forest, NoteFields, NoteRef, NoteTree};
pub use workspace::Workspace;
