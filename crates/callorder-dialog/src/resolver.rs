//! Turning caller utterances into catalog items and option choices.
//!
//! Deterministic matching (digits, number words, names) always runs first.
//! The optional [`ItemMatcher`] is only consulted when all of it fails, and
//! never for longer than the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use callorder_core::catalog::{Catalog, MenuItem, MenuOption, OptionChoice};
use callorder_core::config::MatcherConfig;
use callorder_core::matcher::{ItemMatcher, MatchRequest};

/// Spoken two-digit codes, scanned in order; the first substring hit wins.
const NUMBER_WORDS: &[(&str, &str)] = &[
    ("ten", "10"),
    ("eleven", "11"),
    ("twelve", "12"),
    ("thirteen", "13"),
    ("fourteen", "14"),
    ("fifteen", "15"),
    ("sixteen", "16"),
    ("seventeen", "17"),
    ("eighteen", "18"),
    ("nineteen", "19"),
    ("twenty", "20"),
];

pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Resolves dish codes, dish names and option choices against a catalog.
#[derive(Clone)]
pub struct CatalogResolver {
    matcher: Option<Arc<dyn ItemMatcher>>,
    timeout: Duration,
    threshold: f64,
}

impl Default for CatalogResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CatalogResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogResolver")
            .field("matcher", &self.matcher.as_ref().map(|m| m.name().to_string()))
            .field("timeout", &self.timeout)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl CatalogResolver {
    /// Deterministic resolver with no AI fallback.
    pub fn new() -> Self {
        Self {
            matcher: None,
            timeout: DEFAULT_MATCH_TIMEOUT,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn ItemMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Apply the timeout and threshold from the `[matcher]` config section.
    pub fn with_config(self, config: &MatcherConfig) -> Self {
        self.with_timeout(Duration::from_millis(config.timeout_ms))
            .with_threshold(config.confidence_threshold)
    }

    /// Resolve a dish from a code, a spoken number, a name or, as a last
    /// resort, the AI matcher. The matcher sees the utterance as spoken.
    pub async fn resolve_item<'a>(&self, utterance: &str, catalog: &'a Catalog) -> Option<&'a MenuItem> {
        let text = utterance.trim().to_lowercase();

        if let Some(item) = self.resolve_by_code(&text, catalog) {
            return Some(item);
        }

        if let Some(item) = Self::match_name(&text, catalog) {
            debug!(item_id = %item.id, "Item resolved by name");
            return Some(item);
        }

        self.match_with_ai(utterance, catalog).await
    }

    /// Resolve a dish from keyed digits or a spoken number only.
    pub fn resolve_by_code<'a>(&self, text: &str, catalog: &'a Catalog) -> Option<&'a MenuItem> {
        let mut digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.is_empty() {
            let text = text.to_lowercase();
            if let Some((_, code)) = NUMBER_WORDS.iter().find(|(word, _)| text.contains(word)) {
                digits = code.to_string();
            }
        }

        if digits.len() < 2 {
            return None;
        }

        let item = catalog.find_item(&digits[..2]);
        if let Some(item) = item {
            debug!(item_id = %item.id, "Item resolved by code");
        }
        item
    }

    /// Pick a choice for `option`: by its keyed digit, else by name.
    pub fn resolve_choice<'a>(&self, text: &str, option: &'a MenuOption) -> Option<&'a OptionChoice> {
        if let Some(digit) = text.chars().find(|c| c.is_ascii_digit()) {
            let mut buf = [0u8; 4];
            let digit: &str = digit.encode_utf8(&mut buf);
            if let Some(choice) = option.choices.iter().find(|c| c.id == digit) {
                return Some(choice);
            }
        }

        option
            .choices
            .iter()
            .find(|c| text.contains(&c.name.to_lowercase()))
    }

    fn match_name<'a>(text: &str, catalog: &'a Catalog) -> Option<&'a MenuItem> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        catalog.items.iter().find(|item| {
            let name = item.name.to_lowercase();
            name.contains(&text) || text.contains(&name)
        })
    }

    async fn match_with_ai<'a>(&self, utterance: &str, catalog: &'a Catalog) -> Option<&'a MenuItem> {
        let matcher = self.matcher.as_ref()?;
        let request = MatchRequest::for_catalog(utterance, catalog);

        let candidate = match tokio::time::timeout(self.timeout, matcher.match_item(&request)).await {
            Ok(Ok(candidate)) => candidate,
            Ok(Err(e)) => {
                warn!(matcher = matcher.name(), "AI item match failed: {}", e);
                return None;
            }
            Err(_) => {
                warn!(
                    matcher = matcher.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "AI item match timed out"
                );
                return None;
            }
        };

        let Some(id) = candidate.accepted_id(self.threshold) else {
            debug!(
                confidence = candidate.confidence,
                reasoning = %candidate.reasoning,
                "AI match below threshold"
            );
            return None;
        };

        match catalog.find_item(id) {
            Some(item) => {
                info!(
                    item_id = %item.id,
                    confidence = candidate.confidence,
                    "Item resolved by AI matcher"
                );
                Some(item)
            }
            None => {
                warn!(item_id = %id, "AI matcher proposed an id not in the catalog");
                None
            }
        }
    }
}
