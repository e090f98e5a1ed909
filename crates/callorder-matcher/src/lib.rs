//! Item matchers for free-text dish requests.
//!
//! [`OpenAiItemMatcher`] asks a chat-completions model to map a misheard
//! dish name onto the menu. [`StaticItemMatcher`] answers from a fixed
//! alias table and is used in tests and offline runs.

pub mod openai;

use std::collections::BTreeMap;

use async_trait::async_trait;

use callorder_core::error::Result;
use callorder_core::matcher::{ItemMatcher, MatchCandidate, MatchRequest};

pub use openai::OpenAiItemMatcher;

// =============================================================================
// Static implementation
// =============================================================================

/// Matcher that resolves known phrases to fixed item ids.
///
/// The longest alias contained in the request text wins, with confidence
/// 1.0. No alias means a null candidate with confidence 0.0.
#[derive(Debug, Clone, Default)]
pub struct StaticItemMatcher {
    aliases: BTreeMap<String, String>,
}

impl StaticItemMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, phrase: &str, item_id: &str) -> Self {
        self.aliases
            .insert(phrase.trim().to_lowercase(), item_id.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[async_trait]
impl ItemMatcher for StaticItemMatcher {
    fn name(&self) -> &str {
        "static"
    }

    async fn match_item(&self, request: &MatchRequest) -> Result<MatchCandidate> {
        let text = request.free_text.to_lowercase();
        let hit = self
            .aliases
            .iter()
            .filter(|(phrase, _)| !phrase.is_empty() && text.contains(phrase.as_str()))
            .max_by_key(|(phrase, _)| phrase.len());

        Ok(match hit {
            Some((phrase, id)) => MatchCandidate {
                item_id: Some(id.clone()),
                confidence: 1.0,
                reasoning: format!("alias '{}'", phrase),
            },
            None => MatchCandidate {
                item_id: None,
                confidence: 0.0,
                reasoning: "no alias matched".to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> MatchRequest {
        MatchRequest {
            free_text: text.to_string(),
            menu_listing: "11: Malt Rice Tea (Drinks)\n12: Beef Noodle Soup (Noodles)".to_string(),
        }
    }

    #[tokio::test]
    async fn test_static_matcher_hit() {
        let matcher = StaticItemMatcher::new().with_alias("Malt Tea", "11");
        let candidate = matcher.match_item(&request("um the MALT TEA please")).await.unwrap();
        assert_eq!(candidate.item_id.as_deref(), Some("11"));
        assert_eq!(candidate.accepted_id(0.6), Some("11"));
    }

    #[tokio::test]
    async fn test_static_matcher_prefers_longest_alias() {
        let matcher = StaticItemMatcher::new()
            .with_alias("beef", "12")
            .with_alias("beef tea", "11");
        let candidate = matcher.match_item(&request("beef tea")).await.unwrap();
        assert_eq!(candidate.item_id.as_deref(), Some("11"));
    }

    #[tokio::test]
    async fn test_static_matcher_miss() {
        let matcher = StaticItemMatcher::new().with_alias("malt tea", "11");
        let candidate = matcher.match_item(&request("pizza")).await.unwrap();
        assert!(candidate.item_id.is_none());
        assert_eq!(candidate.accepted_id(0.6), None);
        assert_eq!(matcher.len(), 1);
        assert_eq!(matcher.name(), "static");
    }
}
