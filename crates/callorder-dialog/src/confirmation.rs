//! Yes/no interpretation shared by every confirmation stage.

use std::sync::LazyLock;

use regex::Regex;

/// Standalone single digits only: "20" is not a "2".
static DIGIT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d\b").expect("Invalid digit token regex"));

static YES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:yes|yeah|correct|confirm|place|continue|more)\b")
        .expect("Invalid affirmative regex")
});

static NO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:no|not|wrong|cancel|done|finished|enough|that'?s it)\b")
        .expect("Invalid negative regex")
});

/// Outcome of reading a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Unclear,
}

/// Classify a normalized utterance as yes, no or neither.
///
/// A standalone "1" or an affirmative word means yes; a standalone "2" or a
/// negative word means no. When both are present yes wins, so "no more"
/// reads as yes.
pub fn parse_confirmation(text: &str) -> Confirmation {
    let mut is_yes = YES_RE.is_match(text);
    let mut is_no = NO_RE.is_match(text);

    for token in DIGIT_TOKEN_RE.find_iter(text) {
        match token.as_str() {
            "1" => is_yes = true,
            "2" => is_no = true,
            _ => {}
        }
    }

    if is_yes {
        Confirmation::Yes
    } else if is_no {
        Confirmation::No
    } else {
        Confirmation::Unclear
    }
}
