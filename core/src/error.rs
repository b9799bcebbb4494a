use crate::models::NotePath;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Note not found at path {0}")]
    NotFound(NotePath),

    #[error("Cannot nest below {path}: maximum depth is {max}")]
    DepthExceeded { path: NotePath, max: usize },

    #[error("Tab index {index} out of range ({len} open)")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
