//! Free-text region mentions → canonical catalog region names.
//!
//! Matching order:
//! - exact match after text normalization
//! - alias table (English names, major cities, alternative spellings)
//! - best Jaro-Winkler similarity above the fuzzy threshold

use std::collections::{BTreeMap, HashMap};

use pl_protocol::catalog::is_national_region;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Minimum similarity for a fuzzy match to count as the region.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.88;

/// Minimum similarity for a region to be offered as a suggestion.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.7;

/// Alias → canonical region. Entries whose region is not in the catalog are ignored.
const REGION_ALIASES: &[(&str, &str)] = &[
    // English names
    ("lombardy", "Lombardia"),
    ("piedmont", "Piemonte"),
    ("tuscany", "Toscana"),
    ("sicily", "Sicilia"),
    ("sardinia", "Sardegna"),
    ("apulia", "Puglia"),
    ("aosta valley", "Valle d'Aosta"),
    // Cities
    ("roma", "Lazio"),
    ("rome", "Lazio"),
    ("milano", "Lombardia"),
    ("milan", "Lombardia"),
    ("napoli", "Campania"),
    ("naples", "Campania"),
    ("torino", "Piemonte"),
    ("turin", "Piemonte"),
    ("firenze", "Toscana"),
    ("florence", "Toscana"),
    ("bologna", "Emilia-Romagna"),
    ("venezia", "Veneto"),
    ("venice", "Veneto"),
    ("genova", "Liguria"),
    ("genoa", "Liguria"),
    ("bari", "Puglia"),
    ("palermo", "Sicilia"),
    ("catania", "Sicilia"),
    // Alternative spellings
    ("emilia romagna", "Emilia-Romagna"),
    ("friuli venezia giulia", "Friuli-Venezia Giulia"),
    ("friuli", "Friuli-Venezia Giulia"),
    ("trentino alto adige", "Trentino-Alto Adige"),
    ("trentino", "Trentino-Alto Adige"),
    ("valle daosta", "Valle d'Aosta"),
];

/// Lowercase, strip accents, unify separators and collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '`'))
        .map(|c| if matches!(c, '-' | '_') { ' ' } else { c })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps user region mentions to the regions present in the catalog.
#[derive(Debug, Clone)]
pub struct RegionNormalizer {
    /// Normalized name → canonical name, sorted for deterministic fuzzy ties.
    regions: BTreeMap<String, String>,
    aliases: HashMap<String, String>,
    fuzzy_threshold: f64,
    suggestion_threshold: f64,
}

impl RegionNormalizer {
    pub fn new<I, S>(regions: I, fuzzy_threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regions: BTreeMap<String, String> = regions
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty() && !is_national_region(r))
            .map(|r| (normalize_text(&r), r))
            .collect();

        let aliases: HashMap<String, String> = REGION_ALIASES
            .iter()
            .filter_map(|(alias, canonical)| {
                regions
                    .get(&normalize_text(canonical))
                    .map(|region| (normalize_text(alias), region.clone()))
            })
            .collect();

        tracing::debug!(
            regions = regions.len(),
            aliases = aliases.len(),
            "Region normalizer ready"
        );

        Self {
            regions,
            aliases,
            fuzzy_threshold,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
        }
    }

    pub fn with_suggestion_threshold(mut self, threshold: f64) -> Self {
        self.suggestion_threshold = threshold;
        self
    }

    /// Canonical catalog region for `text`, if one matches.
    pub fn normalize(&self, text: &str) -> Option<String> {
        if is_national_region(text) {
            return None;
        }
        let needle = normalize_text(text);
        if needle.is_empty() {
            return None;
        }

        if let Some(region) = self.regions.get(&needle) {
            return Some(region.clone());
        }
        if let Some(region) = self.aliases.get(&needle) {
            return Some(region.clone());
        }

        let mut best: Option<(f64, &String)> = None;
        for (normalized, canonical) in &self.regions {
            let score = strsim::jaro_winkler(&needle, normalized);
            if score >= self.fuzzy_threshold && best.is_none_or(|(s, _)| score > s) {
                best = Some((score, canonical));
            }
        }

        if let Some((score, region)) = best {
            tracing::debug!(input = %text, region = %region, score, "Fuzzy region match");
        }
        best.map(|(_, region)| region.clone())
    }

    /// Up to `max` regions resembling `text`, best first.
    pub fn suggestions(&self, text: &str, max: usize) -> Vec<String> {
        let needle = normalize_text(text);
        if needle.is_empty() || max == 0 || is_national_region(text) {
            return Vec::new();
        }

        let candidates = self
            .regions
            .iter()
            .chain(self.aliases.iter())
            .map(|(normalized, canonical)| (strsim::jaro_winkler(&needle, normalized), canonical))
            .filter(|(score, _)| *score >= self.suggestion_threshold);

        let mut best: Vec<(f64, &String)> = Vec::new();
        for (score, canonical) in candidates {
            match best.iter_mut().find(|(_, c)| *c == canonical) {
                Some(existing) if existing.0 < score => existing.0 = score,
                Some(_) => {}
                None => best.push((score, canonical)),
            }
        }
        best.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        best.into_iter()
            .take(max)
            .map(|(_, region)| region.clone())
            .collect()
    }
}
