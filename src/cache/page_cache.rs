//! SQLite-backed write-once cache

use crate::cache::schema::initialize_schema;
use crate::cache::{CacheError, CacheResult, CacheTable};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Durable write-once key-value store shared by the fetcher and geocoder
///
/// The connection sits behind a mutex so fetch workers on different tasks
/// can share one cache through an `Arc`. No lock is held across an await.
pub struct PageCache {
    conn: Mutex<Connection>,
}

impl PageCache {
    /// Opens (or creates) the cache database at `path`
    ///
    /// A missing file is a cold cache, not an error.
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened page cache at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory cache
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }

    /// Returns the stored value for `key`, if any
    pub fn get(&self, table: CacheTable, key: &str) -> CacheResult<Option<String>> {
        let conn = self.lock()?;
        let sql = format!("SELECT value FROM {} WHERE key = ?1", table.table_name());
        let value = conn
            .query_row(&sql, params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Returns true if `key` has a stored value
    pub fn contains(&self, table: CacheTable, key: &str) -> CacheResult<bool> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE key = ?1)",
            table.table_name()
        );
        let exists: bool = conn.query_row(&sql, params![key], |row| row.get(0))?;
        Ok(exists)
    }

    /// Stores `value` under `key` unless the key already exists
    ///
    /// Returns true if this call wrote the entry. A put on an existing key
    /// leaves the stored value untouched.
    pub fn put(&self, table: CacheTable, key: &str, value: &str) -> CacheResult<bool> {
        let conn = self.lock()?;
        let sql = format!(
            "INSERT OR IGNORE INTO {} (key, value, fetched_at) VALUES (?1, ?2, ?3)",
            table.table_name()
        );
        let inserted = conn.execute(&sql, params![key, value, Utc::now().to_rfc3339()])?;
        Ok(inserted == 1)
    }

    /// Inserts `value` if absent and returns whichever value is now stored
    ///
    /// When two writers race on the same key, both get back the winner's
    /// value.
    pub fn put_if_absent(&self, table: CacheTable, key: &str, value: &str) -> CacheResult<String> {
        let conn = self.lock()?;
        let insert = format!(
            "INSERT OR IGNORE INTO {} (key, value, fetched_at) VALUES (?1, ?2, ?3)",
            table.table_name()
        );
        let inserted = conn.execute(&insert, params![key, value, Utc::now().to_rfc3339()])?;
        if inserted == 1 {
            return Ok(value.to_string());
        }

        tracing::debug!("Cache entry for {} already present, keeping first write", key);
        let select = format!("SELECT value FROM {} WHERE key = ?1", table.table_name());
        let stored = conn.query_row(&select, params![key], |row| row.get(0))?;
        Ok(stored)
    }

    /// Counts the entries in a table
    pub fn len(&self, table: CacheTable) -> CacheResult<u64> {
        let conn = self.lock()?;
        let sql = format!("SELECT COUNT(*) FROM {}", table.table_name());
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Frontier =====

    /// Adds an institution URL to the frontier
    ///
    /// Returns false if the URL was already present.
    pub fn add_to_frontier(&self, url: &str) -> CacheResult<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO frontier (url, discovered_at) VALUES (?1, ?2)",
            params![url, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    /// Returns true if the URL is in the frontier
    pub fn frontier_contains(&self, url: &str) -> CacheResult<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM frontier WHERE url = ?1)",
            params![url],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Loads the frontier in discovery order
    pub fn frontier(&self) -> CacheResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT url FROM frontier ORDER BY id")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    /// Number of institution URLs in the frontier
    pub fn frontier_len(&self) -> CacheResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM frontier", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Checkpoints the write-ahead log into the main database file
    ///
    /// Called on shutdown; entries are already durable once `put` returns.
    pub fn flush(&self) -> CacheResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
