//! Device-local key/value persistence backing the punch queue and clock display.

use crate::db::initialize::init_queue_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

/// Minimal durable blob store.
///
/// `put` must not return `Ok` before the value is durable: callers adopt the
/// new state in memory only after a successful write.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> AppResult<()>;
}

/// SQLite-backed store; every `put` is its own committed statement.
pub struct SqliteKvStore {
    pool: DbPool,
}

impl SqliteKvStore {
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_queue_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_queue_db(&pool.conn)?;
        Ok(Self { pool })
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = self
            .pool
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.pool
            .conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }
}
