//! OpenAI chat-completions matcher.
//!
//! Sends the condensed menu and the caller's words, asks for a JSON object
//! `{"item_id", "confidence", "reasoning"}` at temperature 0, and parses the
//! answer into a [`MatchCandidate`]. Thresholding and catalog checks happen
//! in the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use callorder_core::config::MatcherConfig;
use callorder_core::error::{CallOrderError, Result};
use callorder_core::matcher::{ItemMatcher, MatchCandidate, MatchRequest};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const SYSTEM_PROMPT: &str = "You match a restaurant caller's spoken request to one item on the menu.\n\
Rules:\n\
1. Reply with ONLY a JSON object: {\"item_id\": \"matched id or null\", \"confidence\": 0.0 to 1.0, \"reasoning\": \"short explanation\"}\n\
2. The request comes from phone speech recognition and often contains phonetic mistakes (for example 'read' for 'sweet' or 'poke' for 'pork').\n\
3. Pick the menu item the caller most likely meant, even through typos.\n\
4. If it is impossible to tell, use null for item_id.";

pub struct OpenAiItemMatcher {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl std::fmt::Debug for OpenAiItemMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiItemMatcher")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl OpenAiItemMatcher {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Per-request HTTP timeout. The dialog engine applies its own bound on
    /// top of this.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CallOrderError::Matcher(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Build from the `[matcher]` section, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &MatcherConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CallOrderError::Config(format!(
                    "AI matcher enabled but {} is not set",
                    config.api_key_env
                ))
            })?;

        let matcher = Self::new(api_key, &config.model)
            .with_endpoint(&config.base_url)
            .with_request_timeout(Duration::from_millis(config.timeout_ms))?;
        info!(model = %config.model, "OpenAI item matcher configured");
        Ok(matcher)
    }

    fn build_request(&self, request: &MatchRequest) -> ChatCompletionRequest {
        let user_prompt = format!(
            "Menu:\n{}\n\nCaller said: \"{}\"\n\nMatch:",
            request.menu_listing, request.free_text
        );
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| CallOrderError::Matcher(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or(body);
            return Err(CallOrderError::Matcher(format!(
                "OpenAI returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CallOrderError::Matcher(format!("Failed to parse OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CallOrderError::Matcher("OpenAI returned no content".to_string()))
    }
}

#[async_trait]
impl ItemMatcher for OpenAiItemMatcher {
    fn name(&self) -> &str {
        "openai"
    }

    async fn match_item(&self, request: &MatchRequest) -> Result<MatchCandidate> {
        let body = self.build_request(request);
        let content = self.send_request(&body).await?;
        let candidate = parse_candidate(&content)?;
        debug!(
            item_id = ?candidate.item_id,
            confidence = candidate.confidence,
            reasoning = %candidate.reasoning,
            "OpenAI match"
        );
        Ok(candidate)
    }
}

/// Parse the model's JSON answer. Numeric ids are accepted as strings.
pub fn parse_candidate(content: &str) -> Result<MatchCandidate> {
    let raw: RawCandidate = serde_json::from_str(content.trim())
        .map_err(|e| CallOrderError::Matcher(format!("Model answer is not a match object: {}", e)))?;

    let item_id = match raw.item_id {
        serde_json::Value::String(s) if !s.trim().is_empty() && s != "null" => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    };

    Ok(MatchCandidate {
        item_id,
        confidence: raw.confidence.unwrap_or(0.0),
        reasoning: raw.reasoning.unwrap_or_default(),
    })
}

#[derive(Deserialize)]
struct RawCandidate {
    #[serde(default)]
    item_id: serde_json::Value,
    confidence: Option<f64>,
    reasoning: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
