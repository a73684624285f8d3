//! Tiered classifier: local rules first, LLM fallback.
//!
//! The rule tier answers purely conversational turns. Everything else goes
//! to the remote tier; with no remote tier configured a local miss is
//! `unclassified`.

use async_trait::async_trait;
use pl_protocol::{ClassificationResult, Language};

use crate::IntentClassifier;
use crate::error::ClassifierResult;
use crate::rules::RuleBasedClassifier;

/// Composite classifier that tries the rule tier first, then the remote tier.
pub struct TieredClassifier {
    local: RuleBasedClassifier,
    remote: Option<Box<dyn IntentClassifier>>,
}

impl TieredClassifier {
    pub fn new(local: RuleBasedClassifier, remote: Option<Box<dyn IntentClassifier>>) -> Self {
        Self { local, remote }
    }

    /// Rules only.
    pub fn local_only() -> Self {
        Self::new(RuleBasedClassifier::new(), None)
    }
}

#[async_trait]
impl IntentClassifier for TieredClassifier {
    async fn classify(
        &self,
        text: &str,
        language: Language,
    ) -> ClassifierResult<ClassificationResult> {
        if let Some(result) = self.local.match_text(text) {
            tracing::debug!(kind = result.smalltalk_kind.as_str(), "rule tier matched");
            return Ok(result);
        }

        match &self.remote {
            Some(remote) => {
                tracing::debug!(tier = remote.tier_name(), "rule tier missed, falling back");
                remote.classify(text, language).await
            }
            None => Ok(ClassificationResult::unclassified()),
        }
    }

    fn tier_name(&self) -> &str {
        "tiered"
    }
}
