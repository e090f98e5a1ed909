//! One pretty-printed JSON file per confirmed order.
//!
//! Files are named `order_{YYYYmmdd_HHMMSS}_{call_id}.json` so a directory
//! listing sorts chronologically.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use callorder_core::error::Result;
use callorder_core::order::{FinalizedOrder, OrderStore};

#[derive(Debug, Clone)]
pub struct JsonDirOrderStore {
    dir: PathBuf,
}

impl JsonDirOrderStore {
    /// Use `dir` for order files, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `order` is (or would be) written.
    pub fn path_for(&self, order: &FinalizedOrder) -> PathBuf {
        let ts = order.timestamp.format("%Y%m%d_%H%M%S");
        self.dir
            .join(format!("order_{}_{}.json", ts, sanitize(&order.call_id)))
    }

    /// Read back every order file, newest first, up to `limit`.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list_recent(&self, limit: u64) -> Result<Vec<FinalizedOrder>> {
        let mut orders = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<FinalizedOrder>(&content) {
                Ok(order) => orders.push(order),
                Err(e) => warn!("Skipping unreadable order file {}: {}", path.display(), e),
            }
        }

        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        orders.truncate(limit as usize);
        Ok(orders)
    }
}

impl OrderStore for JsonDirOrderStore {
    fn save(&self, order: &FinalizedOrder) -> Result<()> {
        let path = self.path_for(order);
        let json = serde_json::to_string_pretty(order)?;
        std::fs::write(&path, json)?;
        debug!(order_id = %order.order_id, "Order file written to {}", path.display());
        Ok(())
    }
}

/// Keep call ids usable as file name fragments.
fn sanitize(call_id: &str) -> String {
    call_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
