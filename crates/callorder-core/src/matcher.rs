//! AI-assisted item matching seam.
//!
//! The dialog engine only depends on [`ItemMatcher`]; concrete matchers live
//! in `callorder-matcher`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::Result;

/// Free text plus the condensed menu the matcher should choose from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub free_text: String,
    /// One "id: name (category)" line per item.
    pub menu_listing: String,
}

impl MatchRequest {
    pub fn for_catalog(free_text: &str, catalog: &Catalog) -> Self {
        Self {
            free_text: free_text.to_string(),
            menu_listing: catalog.condensed_listing(),
        }
    }
}

/// What a matcher believes the caller asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub item_id: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl MatchCandidate {
    /// The candidate id if it clears `threshold` (strictly greater).
    pub fn accepted_id(&self, threshold: f64) -> Option<&str> {
        match self.item_id.as_deref() {
            Some(id) if !id.is_empty() && self.confidence > threshold => Some(id),
            _ => None,
        }
    }
}

/// Free-text to item-id resolver consulted when deterministic matching fails.
#[async_trait]
pub trait ItemMatcher: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn match_item(&self, request: &MatchRequest) -> Result<MatchCandidate>;
}
