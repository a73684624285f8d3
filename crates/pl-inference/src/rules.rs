//! Rule-based classifier: regex patterns for purely conversational turns.
//!
//! Handles greetings, thanks, "how are you", help and "who are you" at zero
//! cost. Greetings and thanks count only when nothing else is said. Anything
//! that mentions a service, or is longer than a short conversational phrase,
//! is left to the LLM tier.

use std::sync::LazyLock;

use async_trait::async_trait;
use pl_protocol::{ClassificationResult, Language, SmalltalkKind};
use regex::Regex;

use crate::IntentClassifier;
use crate::error::ClassifierResult;

/// Confidence assigned to rule matches.
const RULE_CONFIDENCE: f64 = 0.95;

/// Longer utterances are never treated as purely conversational.
const MAX_CONVERSATIONAL_WORDS: usize = 6;

static HELP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(help|aiuto|aiutami|comandi|funzioni)\b").unwrap(),
        Regex::new(r"(?i)\bcosa\s+(sai|puoi)\s+fare\b").unwrap(),
        Regex::new(r"(?i)\bcome\s+funzioni\b").unwrap(),
        Regex::new(r"(?i)\bwhat\s+can\s+you\s+do\b").unwrap(),
    ]
});

static ABOUT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(chi|cosa)\s+sei\b").unwrap(),
        Regex::new(r"(?i)\bchi\s+ti\s+ha\s+(creato|fatto)\b").unwrap(),
        Regex::new(r"(?i)\b(who|what)\s+are\s+you\b").unwrap(),
    ]
});

static CHITCHAT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bcome\s+(va|stai)\b").unwrap(),
        Regex::new(r"(?i)\btutto\s+bene\b").unwrap(),
        Regex::new(r"(?i)\bhow\s+are\s+you\b").unwrap(),
        Regex::new(r"(?i)\b(grazie|thanks|thank\s+you|perfetto|ottimo|great)\b").unwrap(),
    ]
});

static GREETING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)^(ciao|salve|buongiorno|buonasera|hey|hi|hello|hola)\b").unwrap(),
        Regex::new(r"(?i)^good\s+(morning|afternoon|evening)\b").unwrap(),
    ]
});

/// Words that signal a service request even inside a greeting.
static SERVICE_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(spid|cie|bollo|patente|cup|tari|inps|anpr|pagopa|fascicol\w*|scuola|iscrizion\w*|visit\w*|certificat\w*|tass\w*|pension\w*|rifiuti|ricett\w*|prenot\w*|identit\w*|license|licence|tax\w*|appointment|certificate|pension|school|payment|pagare|pagament\w*)\b",
    )
    .unwrap()
});

/// Everything a greeting or thanks turn may contain besides punctuation and emoji.
static CONVERSATIONAL_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(ciao|salve|buongiorno|buonasera|buonanotte|hey|hi|hello|hola|good\s+(morning|afternoon|evening)|grazie(\s+mille)?|thanks|thank\s+you|perfetto|ottimo|great|come\s+(va|stai)|tutto\s+bene|how\s+are\s+you|e\s+tu|and\s+you|a\s+tutti|everyone|there|pastalink|bot|ok|okay)\b",
    )
    .unwrap()
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Pattern-matching classifier for conversational utterances.
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `Some` only when the whole utterance is conversational.
    pub fn match_text(&self, text: &str) -> Option<ClassificationResult> {
        let text = text.trim();
        if text.is_empty() || SERVICE_HINTS.is_match(text) {
            return None;
        }
        if WORD.find_iter(text).count() > MAX_CONVERSATIONAL_WORDS {
            return None;
        }

        // ── Order matters: "ciao, chi sei?" is an about question ──
        let kind = if matches_any(text, &ABOUT_PATTERNS) {
            SmalltalkKind::About
        } else if matches_any(text, &HELP_PATTERNS) {
            SmalltalkKind::Help
        } else if !is_only_conversational(text) {
            return None;
        } else if matches_any(text, &CHITCHAT_PATTERNS) {
            SmalltalkKind::Chitchat
        } else if matches_any(text, &GREETING_PATTERNS) {
            SmalltalkKind::Greeting
        } else {
            return None;
        };

        Some(ClassificationResult::smalltalk(kind, RULE_CONFIDENCE))
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentClassifier for RuleBasedClassifier {
    async fn classify(
        &self,
        text: &str,
        _language: Language,
    ) -> ClassifierResult<ClassificationResult> {
        Ok(self
            .match_text(text)
            .unwrap_or_else(ClassificationResult::unclassified))
    }

    fn tier_name(&self) -> &str {
        "rules"
    }
}

fn matches_any(text: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// True when no word is left once greeting and thanks phrases are removed.
fn is_only_conversational(text: &str) -> bool {
    !WORD.is_match(&CONVERSATIONAL_PHRASES.replace_all(text, " "))
}
