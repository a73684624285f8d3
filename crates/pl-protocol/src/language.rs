use std::fmt;

use serde::{Deserialize, Serialize};

/// Reply language supported by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    It,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::It, Language::En];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::It => "it",
            Language::En => "en",
        }
    }

    /// English name, used inside classifier prompts.
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::It => "Italian",
            Language::En => "English",
        }
    }

    /// Parse a locale such as "it", "it-IT", "en_US" (case-insensitive).
    pub fn from_locale(locale: &str) -> Option<Self> {
        let primary = locale
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == primary)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
