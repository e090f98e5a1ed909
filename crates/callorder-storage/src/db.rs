//! SQLite connection handling for the order database.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use callorder_core::error::{CallOrderError, Result};

use crate::migrations;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA foreign_keys = ON;";

/// A single SQLite connection shared behind a mutex.
///
/// Opening runs every pending migration, so a `Database` is always at the
/// current schema version.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the order database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| CallOrderError::Storage(format!("Failed to open order database: {}", e)))?;
        let db = Self::prepare(conn)?;
        info!("Order database opened at {}", path.display());
        Ok(db)
    }

    /// In-memory database for tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CallOrderError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.execute_batch(PRAGMAS)
            .map_err(|e| CallOrderError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CallOrderError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_orders(db: &Database) -> i64 {
        db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
                .map_err(|e| CallOrderError::Storage(e.to_string()))
        })
        .unwrap()
    }

    #[test]
    fn test_in_memory_database_is_migrated() {
        let db = Database::in_memory().unwrap();
        assert_eq!(count_orders(&db), 0);
    }

    #[test]
    fn test_file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orders.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(count_orders(&db), 0);
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");
        drop(Database::open(&path).unwrap());
        let db = Database::open(&path).unwrap();
        assert_eq!(count_orders(&db), 0);
    }
}
