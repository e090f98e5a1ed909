//! SQLite-backed order store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};

use callorder_core::error::{CallOrderError, Result};
use callorder_core::order::{FinalizedOrder, OrderRecordItem, OrderRecordOption, OrderStore};

use crate::db::Database;

/// Writes each confirmed order and its lines in one transaction.
#[derive(Debug, Clone)]
pub struct SqliteOrderStore {
    db: Arc<Database>,
}

impl SqliteOrderStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Find an order by its id.
    pub fn find_by_id(&self, order_id: &str) -> Result<Option<FinalizedOrder>> {
        self.db.with_conn(|conn| {
            let header = conn
                .query_row(
                    "SELECT order_id, call_id, timestamp_ms, restaurant_name, total_price, status
                     FROM orders WHERE order_id = ?1",
                    rusqlite::params![order_id],
                    read_header,
                )
                .optional()
                .map_err(|e| CallOrderError::Storage(e.to_string()))?;

            match header {
                Some(header) => Ok(Some(header.into_order(conn)?)),
                None => Ok(None),
            }
        })
    }

    /// Most recent orders first.
    pub fn list_recent(&self, limit: u64) -> Result<Vec<FinalizedOrder>> {
        self.query_orders(
            "SELECT order_id, call_id, timestamp_ms, restaurant_name, total_price, status
             FROM orders
             ORDER BY timestamp_ms DESC
             LIMIT ?1",
            rusqlite::params![limit],
        )
    }

    pub fn count(&self) -> Result<u64> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
                .map_err(|e| CallOrderError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    fn query_orders(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<FinalizedOrder>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| CallOrderError::Storage(e.to_string()))?;
            let headers = stmt
                .query_map(params, read_header)
                .map_err(|e| CallOrderError::Storage(e.to_string()))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| CallOrderError::Storage(e.to_string()))?;

            headers
                .into_iter()
                .map(|header| header.into_order(conn))
                .collect()
        })
    }
}

impl OrderStore for SqliteOrderStore {
    fn save(&self, order: &FinalizedOrder) -> Result<()> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| CallOrderError::Storage(format!("Failed to begin transaction: {}", e)))?;

            tx.execute(
                "INSERT INTO orders (order_id, call_id, timestamp_ms, restaurant_name, total_price, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    order.order_id,
                    order.call_id,
                    order.timestamp.timestamp_millis(),
                    order.restaurant_name,
                    order.total_price,
                    order.status.to_string(),
                ],
            )
            .map_err(|e| CallOrderError::Storage(format!("Failed to save order: {}", e)))?;

            for (position, item) in order.items.iter().enumerate() {
                let options_json = serde_json::to_string(&item.options)?;
                tx.execute(
                    "INSERT INTO order_items (order_id, position, item_id, name, price, options_json, total)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        order.order_id,
                        position as i64,
                        item.id,
                        item.name,
                        item.price,
                        options_json,
                        item.total,
                    ],
                )
                .map_err(|e| CallOrderError::Storage(format!("Failed to save order line: {}", e)))?;
            }

            tx.commit()
                .map_err(|e| CallOrderError::Storage(format!("Failed to commit order: {}", e)))?;

            tracing::debug!(order_id = %order.order_id, lines = order.items.len(), "Order row written");
            Ok(())
        })
    }
}

/// The `orders` row before its lines are attached.
struct OrderHeader {
    order_id: String,
    call_id: String,
    timestamp_ms: i64,
    restaurant_name: String,
    total_price: f64,
    status: String,
}

fn read_header(row: &rusqlite::Row) -> rusqlite::Result<OrderHeader> {
    Ok(OrderHeader {
        order_id: row.get(0)?,
        call_id: row.get(1)?,
        timestamp_ms: row.get(2)?,
        restaurant_name: row.get(3)?,
        total_price: row.get(4)?,
        status: row.get(5)?,
    })
}

impl OrderHeader {
    fn into_order(self, conn: &Connection) -> Result<FinalizedOrder> {
        let timestamp = Utc
            .timestamp_millis_opt(self.timestamp_ms)
            .single()
            .ok_or_else(|| {
                CallOrderError::Storage(format!(
                    "Order {} has an invalid timestamp {}",
                    self.order_id, self.timestamp_ms
                ))
            })?;
        let status = self.status.parse().map_err(CallOrderError::Storage)?;
        let items = load_items(conn, &self.order_id)?;

        Ok(FinalizedOrder {
            order_id: self.order_id,
            call_id: self.call_id,
            timestamp,
            restaurant_name: self.restaurant_name,
            items,
            total_price: self.total_price,
            status,
        })
    }
}

fn load_items(conn: &Connection, order_id: &str) -> Result<Vec<OrderRecordItem>> {
    let mut stmt = conn
        .prepare(
            "SELECT item_id, name, price, options_json, total
             FROM order_items WHERE order_id = ?1
             ORDER BY position ASC",
        )
        .map_err(|e| CallOrderError::Storage(e.to_string()))?;

    let rows = stmt
        .query_map(rusqlite::params![order_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
            ))
        })
        .map_err(|e| CallOrderError::Storage(e.to_string()))?;

    let mut items = Vec::new();
    for row in rows {
        let (id, name, price, options_json, total) =
            row.map_err(|e| CallOrderError::Storage(e.to_string()))?;
        let options: Vec<OrderRecordOption> = serde_json::from_str(&options_json)?;
        items.push(OrderRecordItem {
            id,
            name,
            price,
            options,
            total,
        });
    }
    Ok(items)
}
