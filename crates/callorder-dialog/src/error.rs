//! Error types for the dialog engine.
//!
//! None of these are spoken to the caller. The engine logs them and turns
//! them into a recovery prompt.

use callorder_core::error::CallOrderError;

/// Internal faults raised while handling a turn.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("no pending item in stage {0}")]
    MissingPendingItem(crate::stage::Stage),
    #[error("option index {index} out of range for item {item_id}")]
    OptionOutOfRange { item_id: String, index: usize },
    #[error("session lock poisoned: {0}")]
    LockPoisoned(String),
    #[error(transparent)]
    Core(#[from] CallOrderError),
}
