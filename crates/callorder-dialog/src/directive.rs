//! What the telephony layer should do after a turn.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A channel the caller may answer on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Speech,
    Keypad,
}

/// End-of-speech detection policy for the next collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechTimeout {
    #[default]
    Auto,
}

/// The single response produced by every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseDirective {
    /// Speak `prompt`, then collect the next utterance.
    Collect {
        prompt: String,
        input_modes: Vec<InputMode>,
        expected_digits: u8,
        timeout: SpeechTimeout,
    },
    /// Speak `text` and hang up.
    Terminal { text: String, end_call: bool },
}

impl ResponseDirective {
    /// Collect speech or keypad input sized for `stage`.
    pub fn collect(prompt: impl Into<String>, stage: Stage, ordering_digits: u8, selection_digits: u8) -> Self {
        let expected_digits = if stage.expects_item_code() {
            ordering_digits
        } else {
            selection_digits
        };
        ResponseDirective::Collect {
            prompt: prompt.into(),
            input_modes: vec![InputMode::Speech, InputMode::Keypad],
            expected_digits,
            timeout: SpeechTimeout::Auto,
        }
    }

    pub fn terminal(text: impl Into<String>) -> Self {
        ResponseDirective::Terminal {
            text: text.into(),
            end_call: true,
        }
    }

    /// The sentence spoken to the caller.
    pub fn text(&self) -> &str {
        match self {
            ResponseDirective::Collect { prompt, .. } => prompt,
            ResponseDirective::Terminal { text, .. } => text,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResponseDirective::Terminal { .. })
    }

    pub fn expected_digits(&self) -> Option<u8> {
        match self {
            ResponseDirective::Collect { expected_digits, .. } => Some(*expected_digits),
            ResponseDirective::Terminal { .. } => None,
        }
    }
}
