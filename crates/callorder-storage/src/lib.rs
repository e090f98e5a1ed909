//! Durable storage for confirmed orders.
//!
//! Two interchangeable [`OrderStore`] backends: a WAL-mode SQLite database
//! with migrations, and a directory of one JSON file per order. The backend
//! is chosen by the `[storage]` config section.

pub mod db;
pub mod json_store;
pub mod migrations;
pub mod repository;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use callorder_core::config::StorageConfig;
use callorder_core::error::{CallOrderError, Result};
use callorder_core::order::{FinalizedOrder, OrderStore};

pub use db::Database;
pub use json_store::JsonDirOrderStore;
pub use repository::SqliteOrderStore;

/// The configured order backend.
#[derive(Debug, Clone)]
pub enum OrderBackend {
    Sqlite(Arc<SqliteOrderStore>),
    Json(Arc<JsonDirOrderStore>),
}

impl OrderBackend {
    /// Open the backend named by `config.backend` under `data_dir`.
    pub fn open(config: &StorageConfig, data_dir: &Path) -> Result<Self> {
        match config.backend.as_str() {
            "sqlite" => {
                let db = Database::open(&data_dir.join(&config.db_file))?;
                Ok(OrderBackend::Sqlite(Arc::new(SqliteOrderStore::new(Arc::new(db)))))
            }
            "json" => {
                let dir = data_dir.join(&config.orders_dir);
                let store = JsonDirOrderStore::open(&dir)?;
                info!("Writing order files to {}", dir.display());
                Ok(OrderBackend::Json(Arc::new(store)))
            }
            other => Err(CallOrderError::Config(format!(
                "Unknown storage backend '{}', expected 'sqlite' or 'json'",
                other
            ))),
        }
    }

    /// The backend as the sink the dialog engine writes through.
    pub fn store(&self) -> Arc<dyn OrderStore> {
        match self {
            OrderBackend::Sqlite(store) => store.clone() as Arc<dyn OrderStore>,
            OrderBackend::Json(store) => store.clone() as Arc<dyn OrderStore>,
        }
    }

    /// Most recent orders first.
    pub fn list_recent(&self, limit: u64) -> Result<Vec<FinalizedOrder>> {
        match self {
            OrderBackend::Sqlite(store) => store.list_recent(limit),
            OrderBackend::Json(store) => store.list_recent(limit),
        }
    }
}
