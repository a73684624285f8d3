//! Maps a classification onto catalog entries.
//!
//! Decision order, first rule wins:
//! 1. classifier error: `ResolveError::ClassifierUnavailable`
//! 2. smalltalk: `Smalltalk(kind)`
//! 3. off_topic / unclassified: `OffTopic`
//! 4. service_request: ranked catalog lookup, giving `Matched`, `Ambiguous`
//!    or `NoMatch`

use std::sync::Arc;

use pl_catalog::{CatalogLookup, RegionNormalizer, top_rank_group};
use pl_inference::{ClassifierError, ClassifierResult};
use pl_protocol::{Category, ClassificationResult, ResolutionOutcome};
use thiserror::Error;

/// Resolver-level failure. The composer turns it into a transient-error reply.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(#[from] ClassifierError),
}

/// Regions offered back when none of the user's region mentions matched.
const MAX_REGION_SUGGESTIONS: usize = 3;

/// A region mention that matched no catalog region, with close candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownRegion {
    pub mention: String,
    pub suggestions: Vec<String>,
}

/// Resolver verdict for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: ResolutionOutcome,
    /// Set only for `Ambiguous` and `NoMatch`, where a region could change the answer.
    pub unknown_region: Option<UnknownRegion>,
}

impl From<ResolutionOutcome> for Resolution {
    fn from(outcome: ResolutionOutcome) -> Self {
        Self {
            outcome,
            unknown_region: None,
        }
    }
}

pub struct Resolver {
    catalog: Arc<dyn CatalogLookup>,
    regions: RegionNormalizer,
    min_confidence: f64,
    max_links: usize,
}

impl Resolver {
    /// `max_links` is clamped to 2 so an `Ambiguous` outcome always lists two entries.
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        regions: RegionNormalizer,
        min_confidence: f64,
        max_links: usize,
    ) -> Self {
        Self {
            catalog,
            regions,
            min_confidence,
            max_links: max_links.max(2),
        }
    }

    pub fn regions(&self) -> &RegionNormalizer {
        &self.regions
    }

    /// Resolve one classification. `region_hint` comes from the transport
    /// and takes precedence over a region mentioned in the utterance.
    pub fn resolve(
        &self,
        classification: ClassifierResult<ClassificationResult>,
        region_hint: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let classification = classification?.gated(self.min_confidence);

        match classification.category {
            Category::Smalltalk => {
                Ok(ResolutionOutcome::Smalltalk(classification.smalltalk_kind).into())
            }
            Category::OffTopic | Category::Unclassified => Ok(ResolutionOutcome::OffTopic.into()),
            Category::ServiceRequest => Ok(self.resolve_service(&classification, region_hint)),
        }
    }

    fn resolve_service(
        &self,
        classification: &ClassificationResult,
        region_hint: Option<&str>,
    ) -> Resolution {
        let Some(intent) = classification
            .intent
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
        else {
            return ResolutionOutcome::NoMatch.into();
        };

        let mut region = None;
        let mut unmatched = None;
        for mention in region_hint.into_iter().chain(classification.region.as_deref()) {
            match self.regions.normalize(mention) {
                Some(canonical) => {
                    region = Some(canonical);
                    break;
                }
                None => {
                    unmatched.get_or_insert(mention);
                }
            }
        }

        let ranked = self.catalog.lookup_ranked(
            intent,
            classification.sub_intent.as_deref(),
            region.as_deref(),
        );
        let top = top_rank_group(&ranked);

        let outcome = match top.as_slice() {
            [] => ResolutionOutcome::NoMatch,
            [entry] => ResolutionOutcome::Matched(vec![(*entry).clone()]),
            group => ResolutionOutcome::Ambiguous(
                group
                    .iter()
                    .take(self.max_links)
                    .map(|e| (*e).clone())
                    .collect(),
            ),
        };

        tracing::debug!(
            intent = %intent,
            sub_intent = ?classification.sub_intent,
            region = ?region,
            unmatched_region = ?unmatched,
            candidates = ranked.len(),
            outcome = outcome.kind(),
            "catalog lookup"
        );

        let unknown_region = match (&outcome, region, unmatched) {
            (ResolutionOutcome::Ambiguous(_) | ResolutionOutcome::NoMatch, None, Some(mention)) => {
                let suggestions = self.regions.suggestions(mention, MAX_REGION_SUGGESTIONS);
                (!suggestions.is_empty()).then(|| UnknownRegion {
                    mention: mention.trim().to_string(),
                    suggestions,
                })
            }
            _ => None,
        };

        Resolution {
            outcome,
            unknown_region,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pl_catalog::{CatalogIndex, RankedEntry};
    use pl_protocol::{CatalogEntry, SmalltalkKind};

    use super::*;

    /// Counts lookups, delegating to a real index.
    struct SpyLookup {
        inner: CatalogIndex,
        calls: AtomicUsize,
    }

    impl SpyLookup {
        fn new(entries: Vec<CatalogEntry>) -> Self {
            Self {
                inner: CatalogIndex::build(entries).unwrap(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CatalogLookup for SpyLookup {
        fn lookup_ranked(
            &self,
            intent: &str,
            sub_intent: Option<&str>,
            user_region: Option<&str>,
        ) -> Vec<RankedEntry<'_>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup_ranked(intent, sub_intent, user_region)
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new(
                "bollo_auto",
                "",
                "national",
                "Bollo auto",
                "https://www.agenziaentrate.gov.it/bollo",
            ),
            CatalogEntry::new(
                "cup",
                "prenotazione",
                "Lombardia",
                "CUP Lombardia",
                "https://www.prenotasalute.regione.lombardia.it",
            ),
            CatalogEntry::new(
                "cup",
                "prenotazione",
                "Lazio",
                "Recup Lazio",
                "https://www.salutelazio.it/prenotazioni",
            ),
            CatalogEntry::new(
                "cup",
                "prenotazione",
                "Toscana",
                "CUP Toscana",
                "https://prenota.sanita.toscana.it",
            ),
        ]
    }

    fn resolver_with(spy: Arc<SpyLookup>, min_confidence: f64, max_links: usize) -> Resolver {
        let regions = RegionNormalizer::new(spy.inner.regions(), 0.88);
        Resolver::new(spy, regions, min_confidence, max_links)
    }

    fn resolver(min_confidence: f64) -> (Resolver, Arc<SpyLookup>) {
        let spy = Arc::new(SpyLookup::new(catalog()));
        (resolver_with(spy.clone(), min_confidence, 6), spy)
    }

    #[test]
    fn classifier_error_is_resolver_failure() {
        let (resolver, spy) = resolver(0.5);
        let err = resolver
            .resolve(Err(ClassifierError::Timeout { timeout_ms: 10_000 }), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ClassifierUnavailable(ClassifierError::Timeout { .. })
        ));
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn smalltalk_never_looks_up() {
        let (resolver, spy) = resolver(0.5);
        let mut result = ClassificationResult::smalltalk(SmalltalkKind::Greeting, 0.99);
        result.intent = Some("bollo_auto".into());
        let outcome = resolver.resolve(Ok(result), Some("Lombardia")).unwrap().outcome;
        assert_eq!(outcome, ResolutionOutcome::Smalltalk(SmalltalkKind::Greeting));
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn off_topic_and_unclassified_never_look_up() {
        let (resolver, spy) = resolver(0.5);
        let off = resolver
            .resolve(Ok(ClassificationResult::off_topic(0.9)), None)
            .unwrap()
            .outcome;
        let unclassified = resolver
            .resolve(Ok(ClassificationResult::unclassified()), None)
            .unwrap()
            .outcome;
        assert_eq!(off, ResolutionOutcome::OffTopic);
        assert_eq!(unclassified, ResolutionOutcome::OffTopic);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn threshold_boundary() {
        let (resolver, _) = resolver(0.5);
        let outcome = |confidence| {
            resolver
                .resolve(
                    Ok(ClassificationResult::service("bollo_auto", None, confidence)),
                    None,
                )
                .unwrap()
                .outcome
        };
        assert_eq!(outcome(0.5).kind(), "matched");
        assert_eq!(outcome(0.5 + f64::EPSILON).kind(), "matched");
        assert_eq!(outcome(0.5 - f64::EPSILON), ResolutionOutcome::OffTopic);
    }

    #[test]
    fn low_confidence_service_is_off_topic() {
        let (resolver, spy) = resolver(0.5);
        let outcome = resolver
            .resolve(Ok(ClassificationResult::service("bollo_auto", None, 0.3)), None)
            .unwrap()
            .outcome;
        assert_eq!(outcome, ResolutionOutcome::OffTopic);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn national_entry_matches() {
        let (resolver, _) = resolver(0.5);
        let outcome = resolver
            .resolve(Ok(ClassificationResult::service("bollo_auto", None, 0.9)), None)
            .unwrap()
            .outcome;
        match outcome {
            ResolutionOutcome::Matched(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].label, "Bollo auto");
            }
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    #[test]
    fn user_region_picks_single_regional_entry() {
        let (resolver, _) = resolver(0.5);
        let result = ClassificationResult::service("cup", Some("prenotazione"), 0.9);
        let outcome = resolver.resolve(Ok(result), Some("Lombardia")).unwrap().outcome;
        match outcome {
            ResolutionOutcome::Matched(entries) => {
                assert_eq!(entries[0].region, "Lombardia");
            }
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    #[test]
    fn region_from_utterance_is_normalized() {
        let (resolver, _) = resolver(0.5);
        let result =
            ClassificationResult::service("cup", Some("prenotazione"), 0.9).with_region("lazzio");
        let outcome = resolver.resolve(Ok(result), None).unwrap().outcome;
        assert_eq!(outcome.entries()[0].region, "Lazio");
    }

    #[test]
    fn hint_wins_over_utterance_region() {
        let (resolver, _) = resolver(0.5);
        let result =
            ClassificationResult::service("cup", Some("prenotazione"), 0.9).with_region("Lazio");
        let outcome = resolver.resolve(Ok(result), Some("lombardia")).unwrap().outcome;
        assert_eq!(outcome.entries()[0].region, "Lombardia");
    }

    #[test]
    fn unknown_hint_falls_back_to_utterance_region() {
        let (resolver, _) = resolver(0.5);
        let result =
            ClassificationResult::service("cup", Some("prenotazione"), 0.9).with_region("Lazio");
        let outcome = resolver.resolve(Ok(result), Some("Atlantide")).unwrap().outcome;
        assert_eq!(outcome.entries()[0].region, "Lazio");
    }

    #[test]
    fn no_region_gives_ambiguous_in_catalog_order() {
        let (resolver, _) = resolver(0.5);
        let result = ClassificationResult::service("cup", Some("prenotazione"), 0.9);
        match resolver.resolve(Ok(result), None).unwrap().outcome {
            ResolutionOutcome::Ambiguous(entries) => {
                let regions: Vec<_> = entries.iter().map(|e| e.region.as_str()).collect();
                assert_eq!(regions, ["Lombardia", "Lazio", "Toscana"]);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_is_capped() {
        let spy = Arc::new(SpyLookup::new(catalog()));
        let resolver = resolver_with(spy, 0.5, 2);
        let result = ClassificationResult::service("cup", None, 0.9);
        let outcome = resolver.resolve(Ok(result), None).unwrap().outcome;
        assert_eq!(outcome.kind(), "ambiguous");
        assert_eq!(outcome.entries().len(), 2);
    }

    #[test]
    fn hallucinated_intent_is_no_match() {
        let (resolver, spy) = resolver(0.5);
        let outcome = resolver
            .resolve(Ok(ClassificationResult::service("passaporto", None, 0.95)), None)
            .unwrap()
            .outcome;
        assert_eq!(outcome, ResolutionOutcome::NoMatch);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn service_without_intent_is_no_match() {
        let (resolver, spy) = resolver(0.5);
        let mut result = ClassificationResult::service("x", None, 0.9);
        result.intent = None;
        assert_eq!(
            resolver.resolve(Ok(result), None).unwrap().outcome,
            ResolutionOutcome::NoMatch
        );
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ambiguous_cap_never_drops_below_two() {
        let spy = Arc::new(SpyLookup::new(catalog()));
        let resolver = resolver_with(spy, 0.5, 1);
        let result = ClassificationResult::service("cup", Some("prenotazione"), 0.9);
        match resolver.resolve(Ok(result), None).unwrap().outcome {
            ResolutionOutcome::Ambiguous(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn unknown_region_mention_carries_suggestions() {
        let (resolver, _) = resolver(0.5);
        let result = ClassificationResult::service("cup", Some("prenotazione"), 0.9);
        let resolution = resolver.resolve(Ok(result), Some("Lazzaro")).unwrap();
        assert_eq!(resolution.outcome.kind(), "ambiguous");
        let unknown = resolution.unknown_region.unwrap();
        assert_eq!(unknown.mention, "Lazzaro");
        assert_eq!(unknown.suggestions.first().map(String::as_str), Some("Lazio"));
    }

    #[test]
    fn unknown_hint_with_utterance_region_has_no_suggestions() {
        let (resolver, _) = resolver(0.5);
        let result =
            ClassificationResult::service("cup", Some("prenotazione"), 0.9).with_region("Lazio");
        let resolution = resolver.resolve(Ok(result), Some("Lazzaro")).unwrap();
        assert_eq!(resolution.outcome.kind(), "matched");
        assert_eq!(resolution.unknown_region, None);
    }

    #[test]
    fn matched_outcome_has_no_suggestions() {
        let (resolver, _) = resolver(0.5);
        let result = ClassificationResult::service("bollo_auto", None, 0.9);
        let resolution = resolver.resolve(Ok(result), Some("Lazzaro")).unwrap();
        assert_eq!(resolution.outcome.kind(), "matched");
        assert_eq!(resolution.unknown_region, None);
    }

    #[test]
    fn unrelated_mention_has_no_suggestions() {
        let (resolver, _) = resolver(0.5);
        let result = ClassificationResult::service("cup", Some("prenotazione"), 0.9);
        let resolution = resolver.resolve(Ok(result), Some("xyzxyz")).unwrap();
        assert_eq!(resolution.outcome.kind(), "ambiguous");
        assert_eq!(resolution.unknown_region, None);
    }
}
