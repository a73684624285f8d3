//! Input guard: sanitize user text and reject empty, over-long or spam-like input.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::InputConfig;

/// Minimum length before the spam heuristics apply.
const SPAM_CHECK_MIN_CHARS: usize = 10;
/// Unique/total ratio below which text counts as repetitive.
const MIN_UNIQUE_RATIO: f64 = 0.3;
/// Punctuation share above which text counts as noise.
const MAX_PUNCTUATION_RATIO: f64 = 0.5;
/// Above this length repetition is measured on words instead of characters.
const CHAR_REPETITION_MAX_CHARS: usize = 40;

/// Why an utterance was rejected before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputRejection {
    #[error("message is empty")]
    Empty,

    #[error("message longer than {max} characters")]
    TooLong { max: usize },

    #[error("message looks like spam")]
    Spam,
}

impl InputRejection {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InputRejection::Empty => "empty",
            InputRejection::TooLong { .. } => "too_long",
            InputRejection::Spam => "spam",
        }
    }
}

/// Drop control characters, collapse whitespace and trim.
pub fn sanitize(text: &str) -> String {
    let printable: String = text
        .chars()
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length and spam checks over sanitized text.
#[derive(Debug, Clone)]
pub struct InputGuard {
    min_chars: usize,
    max_chars: usize,
}

impl InputGuard {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            min_chars: config.min_message_chars,
            max_chars: config.max_message_chars,
        }
    }

    /// The sanitized text, or the reason it was rejected.
    pub fn check(&self, text: &str) -> Result<String, InputRejection> {
        let sanitized = sanitize(text);
        let len = sanitized.chars().count();

        if len == 0 || len < self.min_chars {
            return Err(InputRejection::Empty);
        }
        if len > self.max_chars {
            return Err(InputRejection::TooLong {
                max: self.max_chars,
            });
        }
        if looks_like_spam(&sanitized, len) {
            return Err(InputRejection::Spam);
        }
        Ok(sanitized)
    }
}

impl Default for InputGuard {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}

fn looks_like_spam(text: &str, len: usize) -> bool {
    if len <= SPAM_CHECK_MIN_CHARS {
        return false;
    }

    let lower = text.to_lowercase();
    let repetition_ratio = if len <= CHAR_REPETITION_MAX_CHARS {
        let unique: HashSet<char> = lower.chars().collect();
        unique.len() as f64 / len as f64
    } else {
        let words: Vec<&str> = lower.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        unique.len() as f64 / words.len() as f64
    };
    if repetition_ratio < MIN_UNIQUE_RATIO {
        return true;
    }

    let punctuation = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();
    (punctuation as f64) / (len as f64) > MAX_PUNCTUATION_RATIO
}
