// SQLite-backed key-value store

use crate::kv::{KeyValueStore, Result, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Durable key-value store on a local SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        // WAL keeps readers unblocked during journal persists
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        conn.execute(SCHEMA, [])
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Open an in-memory store (no file, for tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        conn.execute(SCHEMA, [])
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self { conn })
    }

    fn map_write_error(key: &str, err: rusqlite::Error) -> StorageError {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::DiskFull =>
            {
                StorageError::QuotaExceeded {
                    key: key.to_string(),
                }
            }
            _ => StorageError::Backend(err.to_string()),
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .map_err(|e| Self::map_write_error(key, e))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
            .map_err(|e| Self::map_write_error(key, e))?;
        Ok(())
    }
}
