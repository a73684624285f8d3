//! Immutable catalog index with ranked lookup.
//!
//! Built once at startup from a `CatalogSource`. Entries keep their
//! insertion position, which is the final tie-breaker of every lookup, so
//! results are deterministic for a given catalog.

use std::collections::{BTreeMap, HashMap, HashSet};

use pl_protocol::catalog::{CatalogEntry, NATIONAL_REGION};
use serde::Serialize;
use url::Url;

use crate::error::{CatalogError, CatalogResult};

/// Rank of a candidate entry. Lower is better; compared field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    /// 0 = preferred sub_intent match, 1 = fallback.
    pub sub_intent: u8,
    /// 0 = user's region, 1 = national, 2 = another region.
    pub region: u8,
}

/// A lookup candidate together with its rank.
#[derive(Debug, Clone, Copy)]
pub struct RankedEntry<'a> {
    pub entry: &'a CatalogEntry,
    pub rank: Rank,
}

/// Read-only catalog lookups, as consumed by the resolver.
pub trait CatalogLookup: Send + Sync {
    /// All candidates for `intent`, best first, ties in catalog order.
    fn lookup_ranked(
        &self,
        intent: &str,
        sub_intent: Option<&str>,
        user_region: Option<&str>,
    ) -> Vec<RankedEntry<'_>>;

    /// Same as `lookup_ranked`, without ranks.
    fn lookup(
        &self,
        intent: &str,
        sub_intent: Option<&str>,
        user_region: Option<&str>,
    ) -> Vec<CatalogEntry> {
        self.lookup_ranked(intent, sub_intent, user_region)
            .into_iter()
            .map(|r| r.entry.clone())
            .collect()
    }
}

/// Leading candidates that share the best rank.
pub fn top_rank_group<'a>(ranked: &[RankedEntry<'a>]) -> Vec<&'a CatalogEntry> {
    let Some(best) = ranked.first().map(|r| r.rank) else {
        return Vec::new();
    };
    ranked
        .iter()
        .take_while(|r| r.rank == best)
        .map(|r| r.entry)
        .collect()
}

/// Intent name, a representative label and its known sub_intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentVocabulary {
    pub intent: String,
    pub label: String,
    pub sub_intents: Vec<String>,
}

/// National/regional entry counts for one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentCoverage {
    pub intent: String,
    pub national: usize,
    pub regional: usize,
}

/// Summary of the loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_entries: usize,
    pub intents: usize,
    pub regions: usize,
    pub coverage: Vec<IntentCoverage>,
}

/// The catalog, indexed by intent and by (intent, sub_intent).
#[derive(Debug)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    /// Intents in order of first appearance.
    intent_order: Vec<String>,
    by_intent: HashMap<String, Vec<usize>>,
    by_key: HashMap<(String, String), Vec<usize>>,
    /// Lowercased region → display spelling (first seen), national excluded.
    regions: BTreeMap<String, String>,
}

impl CatalogIndex {
    /// Validate and index `entries`.
    ///
    /// Fails on the first malformed entry or duplicate
    /// (intent, sub_intent, region) key.
    pub fn build(entries: Vec<CatalogEntry>) -> CatalogResult<Self> {
        let mut index = Self {
            entries: Vec::with_capacity(entries.len()),
            intent_order: Vec::new(),
            by_intent: HashMap::new(),
            by_key: HashMap::new(),
            regions: BTreeMap::new(),
        };
        let mut seen: HashSet<(String, String, String)> = HashSet::new();

        for (i, raw) in entries.into_iter().enumerate() {
            let entry = normalize_entry(raw);
            validate_entry(i, &entry)?;

            let region_key = if entry.is_national() {
                NATIONAL_REGION.to_string()
            } else {
                entry.region.to_lowercase()
            };
            if !seen.insert((
                entry.intent.clone(),
                entry.sub_intent.clone(),
                region_key.clone(),
            )) {
                return Err(CatalogError::DuplicateKey {
                    intent: entry.intent,
                    sub_intent: entry.sub_intent,
                    region: entry.region,
                });
            }

            let pos = index.entries.len();
            if !index.by_intent.contains_key(&entry.intent) {
                index.intent_order.push(entry.intent.clone());
            }
            index
                .by_intent
                .entry(entry.intent.clone())
                .or_default()
                .push(pos);
            index
                .by_key
                .entry((entry.intent.clone(), entry.sub_intent.clone()))
                .or_default()
                .push(pos);
            if !entry.is_national() {
                index
                    .regions
                    .entry(region_key)
                    .or_insert_with(|| entry.region.clone());
            }
            index.entries.push(entry);
        }

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Known intents, sorted.
    pub fn intents(&self) -> Vec<String> {
        let mut intents = self.intent_order.clone();
        intents.sort();
        intents
    }

    /// Known specific regions (national excluded), sorted.
    pub fn regions(&self) -> Vec<String> {
        self.regions.values().cloned().collect()
    }

    pub fn has_intent(&self, intent: &str) -> bool {
        self.by_intent.contains_key(&normalize_key(intent))
    }

    /// Intent vocabulary for classifier prompts, in catalog order.
    pub fn vocabulary(&self) -> Vec<IntentVocabulary> {
        self.intent_order
            .iter()
            .map(|intent| {
                let positions = &self.by_intent[intent];
                let mut sub_intents: Vec<String> = Vec::new();
                for &pos in positions {
                    let sub = &self.entries[pos].sub_intent;
                    if !sub.is_empty() && !sub_intents.contains(sub) {
                        sub_intents.push(sub.clone());
                    }
                }
                IntentVocabulary {
                    intent: intent.clone(),
                    label: self.entries[positions[0]].label.clone(),
                    sub_intents,
                }
            })
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let coverage = self
            .intents()
            .into_iter()
            .map(|intent| {
                let national = self.by_intent[&intent]
                    .iter()
                    .filter(|&&pos| self.entries[pos].is_national())
                    .count();
                let regional = self.by_intent[&intent].len() - national;
                IntentCoverage {
                    intent,
                    national,
                    regional,
                }
            })
            .collect();

        CatalogStats {
            total_entries: self.entries.len(),
            intents: self.intent_order.len(),
            regions: self.regions.len(),
            coverage,
        }
    }
}

impl CatalogLookup for CatalogIndex {
    fn lookup_ranked(
        &self,
        intent: &str,
        sub_intent: Option<&str>,
        user_region: Option<&str>,
    ) -> Vec<RankedEntry<'_>> {
        let intent = normalize_key(intent);
        let Some(positions) = self.by_intent.get(&intent) else {
            return Vec::new();
        };

        // A requested sub_intent only narrows the search when the catalog knows it.
        let requested = sub_intent
            .map(normalize_key)
            .filter(|s| !s.is_empty() && self.by_key.contains_key(&(intent.clone(), s.clone())));
        let user_region = user_region.map(str::trim).filter(|r| !r.is_empty());

        let mut ranked: Vec<RankedEntry<'_>> = positions
            .iter()
            .filter_map(|&pos| {
                let entry = &self.entries[pos];
                let sub_rank = match requested.as_deref() {
                    Some(wanted) if entry.sub_intent == wanted => 0,
                    Some(_) if entry.sub_intent.is_empty() => 1,
                    Some(_) => return None,
                    None if entry.sub_intent.is_empty() => 0,
                    None => 1,
                };
                let region_rank = match user_region {
                    Some(region) if entry.in_region(region) => 0,
                    _ if entry.is_national() => 1,
                    _ => 2,
                };
                Some(RankedEntry {
                    entry,
                    rank: Rank {
                        sub_intent: sub_rank,
                        region: region_rank,
                    },
                })
            })
            .collect();

        // Stable: equal ranks keep catalog order.
        ranked.sort_by_key(|r| r.rank);
        ranked
    }
}

fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

fn normalize_entry(entry: CatalogEntry) -> CatalogEntry {
    CatalogEntry {
        intent: normalize_key(&entry.intent),
        sub_intent: normalize_key(&entry.sub_intent),
        region: entry.region.trim().to_string(),
        label: entry.label.trim().to_string(),
        url: entry.url.trim().to_string(),
        notes: entry.notes.trim().to_string(),
    }
}

fn validate_entry(index: usize, entry: &CatalogEntry) -> CatalogResult<()> {
    let invalid = |reason: String| CatalogError::InvalidEntry { index, reason };

    if entry.intent.is_empty() {
        return Err(invalid("intent is empty".into()));
    }
    if entry.region.is_empty() {
        return Err(invalid("region is empty".into()));
    }
    if entry.label.is_empty() {
        return Err(invalid("label is empty".into()));
    }

    let url = Url::parse(&entry.url).map_err(|e| invalid(format!("url {:?}: {e}", entry.url)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid(format!("url {:?} is not an http(s) link", entry.url)));
    }

    Ok(())
}
