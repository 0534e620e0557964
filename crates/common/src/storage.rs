//! Durable client-side key/value storage.
//!
//! The session store persists its state under three fixed keys; everything
//! goes through the [`KeyValueStore`] trait so tests can run against an
//! in-memory database.

use std::path::Path;

use parking_lot::Mutex;
use thiserror::Error;

/// Bearer token for the current session.
pub const KEY_TOKEN: &str = "token";
/// JSON-serialized [`crate::models::User`].
pub const KEY_USER: &str = "user";
/// Role name as a plain string.
pub const KEY_ROLE: &str = "role";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed store with a single `kv` table.
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = rusqlite::Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            );",
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get::<_, String>(0));
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET
                 value = ?2,
                 updated_at = CURRENT_TIMESTAMP",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert!(store.get(KEY_TOKEN).unwrap().is_none());

        store.set(KEY_TOKEN, "jwt-abc").unwrap();
        assert_eq!(store.get(KEY_TOKEN).unwrap().as_deref(), Some("jwt-abc"));

        store.set(KEY_TOKEN, "jwt-def").unwrap();
        assert_eq!(store.get(KEY_TOKEN).unwrap().as_deref(), Some("jwt-def"));

        store.remove(KEY_TOKEN).unwrap();
        assert!(store.get(KEY_TOKEN).unwrap().is_none());
    }

    #[test]
    fn remove_missing_key_is_a_no_op() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.remove("never-set").unwrap();
    }

    #[test]
    fn keys_are_independent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set(KEY_USER, "{}").unwrap();
        store.set(KEY_ROLE, "employee").unwrap();
        store.remove(KEY_USER).unwrap();
        assert_eq!(store.get(KEY_ROLE).unwrap().as_deref(), Some("employee"));
    }
}
