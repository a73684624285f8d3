//! Minimum-confidence gate around any classifier.

use async_trait::async_trait;
use pl_protocol::{Category, ClassificationResult, Language};

use crate::IntentClassifier;
use crate::error::ClassifierResult;

/// Downgrades results below `min_confidence` to `unclassified`.
pub struct GatedClassifier {
    inner: Box<dyn IntentClassifier>,
    min_confidence: f64,
}

impl GatedClassifier {
    pub fn new(inner: Box<dyn IntentClassifier>, min_confidence: f64) -> Self {
        Self {
            inner,
            min_confidence,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }
}

#[async_trait]
impl IntentClassifier for GatedClassifier {
    async fn classify(
        &self,
        text: &str,
        language: Language,
    ) -> ClassifierResult<ClassificationResult> {
        let result = self.inner.classify(text, language).await?;
        let category = result.category;
        let gated = result.gated(self.min_confidence);

        if category != Category::Unclassified && gated.category == Category::Unclassified {
            tracing::debug!(
                category = category.as_str(),
                confidence = gated.confidence,
                min_confidence = self.min_confidence,
                "classification below confidence threshold"
            );
        }
        Ok(gated)
    }

    fn tier_name(&self) -> &str {
        self.inner.tier_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockClassifier;

    async fn gate(confidence: f64, min: f64) -> ClassificationResult {
        let inner = MockClassifier::always(ClassificationResult::service("tari", None, confidence));
        GatedClassifier::new(Box::new(inner), min)
            .classify("tari", Language::It)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn threshold_boundary() {
        let min = 0.5;
        assert_eq!(gate(min, min).await.category, Category::ServiceRequest);
        assert_eq!(gate(min + 1e-9, min).await.category, Category::ServiceRequest);
        assert_eq!(gate(min - 1e-9, min).await.category, Category::Unclassified);
    }

    #[tokio::test]
    async fn downgrade_drops_intent() {
        let result = gate(0.3, 0.5).await;
        assert!(result.intent.is_none());
        assert!((result.confidence - 0.3).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let gated = GatedClassifier::new(Box::new(MockClassifier::unavailable("down")), 0.5);
        assert!(gated.classify("tari", Language::It).await.is_err());
        assert_eq!(gated.tier_name(), "mock");
    }
}
