//! Per-utterance pipeline: detect language, guard input, answer commands,
//! classify, resolve, compose.
//!
//! `Pipeline::handle` never fails. Every per-request condition (rejected
//! input, LLM timeout, unknown intent) becomes a reply.

use std::sync::Arc;
use std::time::Instant;

use pl_catalog::{CatalogIndex, RegionNormalizer};
use pl_inference::{
    ClassifierResult, GatedClassifier, IntentClassifier, OllamaClassifier, PromptContext,
    RuleBasedClassifier, TieredClassifier,
};
use pl_protocol::{IncomingMessage, Language, Reply};

use crate::commands::BotCommand;
use crate::composer::Composer;
use crate::config::BotConfig;
use crate::guard::InputGuard;
use crate::i18n::{BuiltinLocalizer, Localizer};
use crate::language::LanguageDetector;
use crate::resolver::Resolver;

/// Rule tier, plus the Ollama tier when enabled, behind the confidence gate.
pub fn build_classifier(
    config: &BotConfig,
    catalog: &CatalogIndex,
) -> ClassifierResult<Arc<dyn IntentClassifier>> {
    let remote: Option<Box<dyn IntentClassifier>> = if config.ollama.enabled {
        let context = PromptContext::new(catalog.vocabulary(), catalog.regions());
        tracing::info!(
            host = %config.ollama.host,
            model = %config.ollama.model,
            timeout_secs = config.ollama.timeout_secs,
            "LLM tier enabled"
        );
        Some(Box::new(OllamaClassifier::new(config.ollama.clone(), context)?))
    } else {
        tracing::warn!("LLM tier disabled, only conversational turns will be recognized");
        None
    };

    let tiered = TieredClassifier::new(RuleBasedClassifier::new(), remote);
    Ok(Arc::new(GatedClassifier::new(
        Box::new(tiered),
        config.min_confidence,
    )))
}

pub struct Pipeline {
    detector: LanguageDetector,
    guard: InputGuard,
    classifier: Arc<dyn IntentClassifier>,
    resolver: Resolver,
    composer: Composer,
    regions: Vec<String>,
}

impl Pipeline {
    /// Wire a pipeline over `catalog` with the built-in localizer.
    pub fn new(
        config: &BotConfig,
        catalog: Arc<CatalogIndex>,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Self {
        let localizer = BuiltinLocalizer::new(config.fallback_language);
        Self::with_localizer(config, catalog, classifier, Arc::new(localizer))
    }

    pub fn with_localizer(
        config: &BotConfig,
        catalog: Arc<CatalogIndex>,
        classifier: Arc<dyn IntentClassifier>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        let regions = catalog.regions();
        let normalizer = RegionNormalizer::new(&regions, config.regions.fuzzy_threshold)
            .with_suggestion_threshold(config.regions.suggestion_threshold);
        let resolver = Resolver::new(
            catalog,
            normalizer,
            config.min_confidence,
            config.max_links_per_response,
        );

        Self {
            detector: LanguageDetector::new(config.fallback_language),
            guard: InputGuard::new(&config.input),
            classifier,
            resolver,
            composer: Composer::new(localizer),
            regions,
        }
    }

    pub async fn handle(&self, message: &IncomingMessage) -> Reply {
        let started = Instant::now();
        let language = self
            .detector
            .detect(message.locale_hint.as_deref(), &message.text);

        let (reply, outcome) = self.reply_for(message, language).await;

        tracing::info!(
            conversation_id = %message.conversation_id,
            request_id = %reply.request_id,
            language = %language,
            outcome,
            tier = self.classifier.tier_name(),
            latency_ms = started.elapsed().as_millis() as u64,
            "message handled"
        );
        reply
    }

    async fn reply_for(&self, message: &IncomingMessage, language: Language) -> (Reply, &'static str) {
        let conversation_id = message.conversation_id.as_str();

        let text = match self.guard.check(&message.text) {
            Ok(text) => text,
            Err(rejection) => {
                tracing::debug!(conversation_id, reason = rejection.kind(), "input rejected");
                return (
                    self.composer
                        .invalid_input(conversation_id, language, &rejection),
                    "invalid_input",
                );
            }
        };

        if let Some(command) = BotCommand::parse(&text) {
            return (
                self.composer
                    .command(conversation_id, language, command, &self.regions),
                "command",
            );
        }

        let classification = self.classifier.classify(&text, language).await;
        match self
            .resolver
            .resolve(classification, message.region_hint.as_deref())
        {
            Ok(resolution) => (
                self.composer
                    .compose_resolution(conversation_id, language, &resolution),
                resolution.outcome.kind(),
            ),
            Err(e) => {
                tracing::warn!(conversation_id, error = %e, "classification failed");
                (
                    self.composer.transient_error(conversation_id, language),
                    "transient_error",
                )
            }
        }
    }
}
