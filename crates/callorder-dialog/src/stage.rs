//! Position of a call in the ordering dialog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dialog stage of one call.
///
/// `Init` is transient: the first real turn treats it as `OrderingId`.
/// `Completed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[default]
    Init,
    /// Waiting for a dish code or name.
    OrderingId,
    /// Walking through the pending item's options one at a time.
    SelectingOption,
    /// Pending item fully configured, waiting for yes/no.
    ConfirmingItem,
    /// Item added, asking whether the caller wants anything else.
    AskAddMore,
    /// Order summary read back, waiting for place/cancel.
    ConfirmingOrder,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Init => write!(f, "INIT"),
            Stage::OrderingId => write!(f, "ORDERING_ID"),
            Stage::SelectingOption => write!(f, "SELECTING_OPTION"),
            Stage::ConfirmingItem => write!(f, "CONFIRMING_ITEM"),
            Stage::AskAddMore => write!(f, "ASK_ADD_MORE"),
            Stage::ConfirmingOrder => write!(f, "CONFIRMING_ORDER"),
            Stage::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl Stage {
    /// Whether a pending item may exist in this stage.
    pub fn holds_pending_item(&self) -> bool {
        matches!(self, Stage::SelectingOption | Stage::ConfirmingItem)
    }

    /// Whether the caller is expected to key a dish code.
    pub fn expects_item_code(&self) -> bool {
        matches!(self, Stage::Init | Stage::OrderingId)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed)
    }
}
