//! Folding the signals a telephony turn can carry into one utterance.

use serde::{Deserialize, Serialize};

/// Everything one inbound turn may carry. Backends fill whichever fields
/// they produce; the engine only ever sees the folded utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSignals {
    /// Completed transcript from a streaming recognizer.
    #[serde(default)]
    pub transcription: Option<String>,
    /// Result of the platform's built-in speech gather.
    #[serde(default)]
    pub speech: Option<String>,
    /// Keypad presses.
    #[serde(default)]
    pub digits: Option<String>,
}

impl TurnSignals {
    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            speech: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn digits(keys: impl Into<String>) -> Self {
        Self {
            digits: Some(keys.into()),
            ..Self::default()
        }
    }

    /// Transcription, then speech, then digits; blank signals are skipped.
    /// Returns an empty string when nothing usable arrived.
    pub fn into_utterance(self) -> String {
        [self.transcription, self.speech, self.digits]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default()
    }
}
