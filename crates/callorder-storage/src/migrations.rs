//! Order database schema.

use rusqlite::Connection;
use tracing::info;

use callorder_core::error::{CallOrderError, Result};

/// Bring the schema up to the latest version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| CallOrderError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| CallOrderError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: orders");
    }

    Ok(())
}

/// Version 1: confirmed orders and their lines.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS orders (
            order_id        TEXT PRIMARY KEY NOT NULL,
            call_id         TEXT NOT NULL,
            timestamp_ms    INTEGER NOT NULL,
            restaurant_name TEXT NOT NULL,
            total_price     REAL NOT NULL,
            status          TEXT NOT NULL
                            CHECK (status IN ('CONFIRMED')),
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_orders_timestamp
            ON orders (timestamp_ms DESC);

        CREATE INDEX IF NOT EXISTS idx_orders_call_id
            ON orders (call_id);

        -- Options are stored as the JSON array written to order files.
        CREATE TABLE IF NOT EXISTS order_items (
            order_id        TEXT NOT NULL
                            REFERENCES orders (order_id) ON DELETE CASCADE,
            position        INTEGER NOT NULL,
            item_id         TEXT NOT NULL,
            name            TEXT NOT NULL,
            price           REAL NOT NULL,
            options_json    TEXT NOT NULL DEFAULT '[]',
            total           REAL NOT NULL,
            PRIMARY KEY (order_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_order_items_item_id
            ON order_items (item_id);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'orders');
        ",
    )
    .map_err(|e| CallOrderError::Storage(format!("Migration v1 failed: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(conn: &Connection) -> i64 {
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(version(&conn), 1);

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_status_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO orders (order_id, call_id, timestamp_ms, restaurant_name, total_price, status)
             VALUES ('ORD-1', 'CA1', 0, 'R', 1.0, 'PENDING')",
            [],
        );
        assert!(result.is_err());
    }
}
