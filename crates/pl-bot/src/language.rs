//! Reply language detection (Italian / English).

use std::collections::HashSet;
use std::sync::LazyLock;

use pl_protocol::Language;
use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}']+").unwrap());

static ITALIAN_STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "il", "lo", "la", "i", "gli", "le", "un", "una", "uno", "di", "del", "della", "dei", "da",
        "in", "con", "su", "per", "tra", "fra", "e", "che", "non", "mi", "ti", "si", "ci", "come",
        "dove", "quando", "cosa", "sono", "sei", "ho", "hai", "posso", "devo", "vorrei", "voglio",
        "serve", "mio", "mia", "ciao", "grazie", "buongiorno", "pagare", "prenotare", "rinnovare",
        "richiedere", "quanto", "costa", "anche", "ma", "nel", "nella", "al", "alla",
    ]
    .into_iter()
    .collect()
});

static ENGLISH_STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "of", "to", "in", "on", "for", "with", "and", "or", "is", "are", "am",
        "do", "does", "can", "could", "how", "where", "when", "what", "who", "my", "i", "you",
        "me", "need", "want", "would", "like", "get", "pay", "book", "renew", "hello", "hi",
        "thanks", "please", "much", "cost", "tax", "car", "license", "this", "that", "it",
    ]
    .into_iter()
    .collect()
});

/// Picks IT or EN from a locale hint and/or the utterance text.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    fallback: Language,
}

impl LanguageDetector {
    pub fn new(fallback: Language) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Language {
        self.fallback
    }

    /// A supported locale hint wins; otherwise stop-word scoring; ties use the fallback.
    pub fn detect(&self, locale_hint: Option<&str>, text: &str) -> Language {
        if let Some(language) = locale_hint.and_then(Language::from_locale) {
            return language;
        }

        let lower = text.to_lowercase();
        let mut italian = 0usize;
        let mut english = 0usize;
        for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
            // "dov'è", "l'auto": score both halves
            for part in word.split('\'').filter(|p| !p.is_empty()) {
                if ITALIAN_STOP_WORDS.contains(part) {
                    italian += 1;
                }
                if ENGLISH_STOP_WORDS.contains(part) {
                    english += 1;
                }
            }
        }
        if lower.contains(['à', 'è', 'é', 'ì', 'ò', 'ù']) {
            italian += 1;
        }

        match italian.cmp(&english) {
            std::cmp::Ordering::Greater => Language::It,
            std::cmp::Ordering::Less => Language::En,
            std::cmp::Ordering::Equal => self.fallback,
        }
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(Language::It)
    }
}
