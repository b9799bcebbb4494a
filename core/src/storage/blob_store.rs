use super::database::{Connection, Database};
use crate::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Keyed blob persistence used for write-back of the whole forest.
pub trait BlobStore {
    /// Read the blob stored under `key`, `None` if absent
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed blob store, one row per key
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Open (creating if needed) the database at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Database::new(db_path).open()?;
        Ok(Self { conn })
    }

    /// Store backed by a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Database::in_memory()?,
        })
    }

    /// When the blob under `key` was last written
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let timestamp: Option<i64> = self
            .conn
            .query_row(
                "SELECT updated_at FROM blobs WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(timestamp.map(|ts| DateTime::from_timestamp(ts, 0).unwrap_or_default()))
    }
}

impl BlobStore for SqliteBlobStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM blobs WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

/// Volatile store for tests and throwaway sessions.
///
/// Clones share the same blobs, so a test can keep a handle while the tree owns
/// another.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    inner: Rc<RefCell<MemoryBlobs>>,
}

#[derive(Debug, Default)]
struct MemoryBlobs {
    blobs: HashMap<String, String>,
    writes: usize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.borrow().blobs.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.blobs.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FOREST_KEY, TASKS_KEY};
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_missing_key() {
        let store = SqliteBlobStore::in_memory().unwrap();
        assert_eq!(store.load("notes").unwrap(), None);
        assert_eq!(store.updated_at("notes").unwrap(), None);
    }

    #[test]
    fn test_sqlite_save_overwrites() {
        let mut store = SqliteBlobStore::in_memory().unwrap();
        store.save("notes", "[]").unwrap();
        store.save("notes", "[1]").unwrap();
        assert_eq!(store.load("notes").unwrap().as_deref(), Some("[1]"));
        assert!(store.updated_at("notes").unwrap().is_some());
    }

    #[test]
    fn test_sqlite_keys_are_independent() {
        let mut store = SqliteBlobStore::in_memory().unwrap();
        store.save("notes", "a").unwrap();
        store.save(TASKS_KEY, "b").unwrap();
        assert_eq!(store.load(FOREST_KEY).unwrap().as_deref(), Some("a"));
        assert_eq!(store.load(TASKS_KEY).unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("grove.db");

        {
            let mut store = SqliteBlobStore::open(&db_path).unwrap();
            store.save("notes", "persisted").unwrap();
        }

        let store = SqliteBlobStore::open(&db_path).unwrap();
        assert_eq!(store.load("notes").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryBlobStore::new();
        assert_eq!(store.load("notes").unwrap(), None);
        store.save("notes", "x").unwrap();
        store.save("notes", "y").unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.load("notes").unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn test_memory_store_clones_share_blobs() {
        let handle = MemoryBlobStore::new();
        let mut owned = handle.clone();
        owned.save("notes", "shared").unwrap();
        assert_eq!(handle.load("notes").unwrap().as_deref(), Some("shared"));
        assert_eq!(handle.write_count(), 1);
    }
}
