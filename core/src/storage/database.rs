use crate::{Error, Result};
use log::debug;
use rusqlite::Connection as SqliteConnection;
use std::path::{Path, PathBuf};

pub type Connection = SqliteConnection;

/// Schema version this build writes and understands
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = include_str!("../../schema.sql");

/// The SQLite file behind a [`SqliteBlobStore`](super::SqliteBlobStore).
///
/// Opening is idempotent: the schema only uses `IF NOT EXISTS` statements, so a
/// fresh file and an existing one go through the same path.
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.db_path.exists()
    }

    /// Open the file, creating it and its parent directory when missing
    pub fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = SqliteConnection::open(&self.db_path)?;
        prepare(&conn)?;
        debug!("event=db_opened module=storage path={}", self.db_path.display());
        Ok(conn)
    }

    /// Private database that disappears with the connection
    pub fn in_memory() -> Result<Connection> {
        let conn = SqliteConnection::open_in_memory()?;
        prepare(&conn)?;
        Ok(conn)
    }
}

/// Version recorded in the `metadata` table
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let version: String = conn.query_row(
        "SELECT value FROM metadata WHERE key = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    version
        .parse()
        .map_err(|_| Error::InvalidInput(format!("bad schema version `{}`", version)))
}

fn prepare(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    let version = schema_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(Error::InvalidInput(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }
    Ok(())
}
