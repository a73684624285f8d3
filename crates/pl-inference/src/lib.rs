//! Natural-language intent classification.
//!
//! Converts user text ("come pago il bollo auto?", "ciao!") into a
//! structured `ClassificationResult` with category, intent, sub_intent,
//! region and confidence.
//!
//! Two tiers:
//! - **Rule-based** (local): regex patterns for purely conversational turns.
//! - **Ollama** (remote LLM): constrained JSON output for everything else.
//!
//! `GatedClassifier` applies the minimum-confidence policy on top of either.

pub mod error;
pub mod gated;
pub mod mock;
pub mod ollama;
pub mod prompt;
pub mod rules;
pub mod schema;
pub mod tiered;

use async_trait::async_trait;
use pl_protocol::{ClassificationResult, Language};

pub use error::{ClassifierError, ClassifierResult, SchemaViolation};
pub use gated::GatedClassifier;
pub use mock::MockClassifier;
pub use ollama::{OllamaClassifier, OllamaConfig};
pub use prompt::PromptContext;
pub use rules::RuleBasedClassifier;
pub use tiered::TieredClassifier;

/// Trait for classifiers that turn an utterance into a classification.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify `text`, written (most likely) in `language`.
    ///
    /// `Err` means the collaborator failed (unreachable, timed out);
    /// "don't know" is `Ok(ClassificationResult::unclassified())`.
    async fn classify(&self, text: &str, language: Language)
    -> ClassifierResult<ClassificationResult>;

    /// Name of this classifier tier (for logging).
    fn tier_name(&self) -> &str;
}
