//! Durable key-value slots for studybuddy.
//!
//! A slot is a named value that survives the session. The card store keeps
//! its whole collection in one slot and rewrites it on every change.
//! [`SqliteSlot`] is the on-disk backend; [`MemorySlot`] keeps everything in
//! process and is what the tests use.

mod memory;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use memory::MemorySlot;

/// Named, persistent key-value storage.
pub trait DurableSlot: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] if the value is larger than the
    /// backend accepts, or an error if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Clear the slot. Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Reject `value` if it does not fit in `quota`.
pub(crate) fn check_quota(value: &str, quota: Option<usize>) -> Result<()> {
    match quota {
        Some(quota) if value.len() > quota => Err(Error::QuotaExceeded {
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}

/// `SQLite`-backed durable slots.
#[derive(Debug)]
pub struct SqliteSlot {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
    /// Largest value accepted by `write`, in bytes.
    quota: Option<usize>,
}

impl SqliteSlot {
    /// Open or create a slot database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// and migrates the schema to the current version.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening slot database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Slot database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
            quota: None,
        })
    }

    /// Create an in-memory slot database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
            quota: None,
        })
    }

    /// Limit the size of values accepted by `write`.
    #[must_use]
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<SlotStats> {
        let conn = self.lock()?;

        let total_slots: i64 = conn.query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))?;

        let last: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM slots ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_write = last
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(SlotStats {
            total_slots,
            last_write,
            db_size_bytes,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("slot database lock poisoned"))
    }
}

impl DurableSlot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .lock()?
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        check_quota(value, self.quota)?;

        self.lock()?.execute(
            r"
            INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} bytes to slot '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self.lock()?.execute("DELETE FROM slots WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }
}

/// Statistics about the slot database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStats {
    /// Number of occupied slots.
    pub total_slots: i64,
    /// When any slot was last written.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
