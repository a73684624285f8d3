//! Mock classifier for testing: scripted replies, call counting, delays.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pl_protocol::{ClassificationResult, Language};

use crate::IntentClassifier;
use crate::error::{ClassifierError, ClassifierResult};

/// Scripted reply of the mock.
#[derive(Debug, Clone)]
enum MockReply {
    Result(ClassificationResult),
    Error(ClassifierError),
}

/// A classifier that replies from a script keyed by exact text.
pub struct MockClassifier {
    replies: HashMap<String, MockReply>,
    fallback: MockReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Always reply with `result`.
    pub fn always(result: ClassificationResult) -> Self {
        Self::with_fallback(MockReply::Result(result))
    }

    /// Always fail with `ClassifierError::Timeout`.
    pub fn timing_out(timeout_ms: u64) -> Self {
        Self::with_fallback(MockReply::Error(ClassifierError::Timeout { timeout_ms }))
    }

    /// Always fail with `ClassifierError::Unavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_fallback(MockReply::Error(ClassifierError::Unavailable(reason.into())))
    }

    fn with_fallback(fallback: MockReply) -> Self {
        Self {
            replies: HashMap::new(),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Reply with `result` when the text is exactly `text`.
    pub fn with_reply(mut self, text: impl Into<String>, result: ClassificationResult) -> Self {
        self.replies.insert(text.into(), MockReply::Result(result));
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `classify` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(
        &self,
        text: &str,
        _language: Language,
    ) -> ClassifierResult<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.replies.get(text).unwrap_or(&self.fallback) {
            MockReply::Result(result) => Ok(result.clone()),
            MockReply::Error(e) => Err(e.clone()),
        }
    }

    fn tier_name(&self) -> &str {
        "mock"
    }
}

/// Shared mocks keep their call counter visible to the test.
#[async_trait]
impl IntentClassifier for Arc<MockClassifier> {
    async fn classify(
        &self,
        text: &str,
        language: Language,
    ) -> ClassifierResult<ClassificationResult> {
        self.as_ref().classify(text, language).await
    }

    fn tier_name(&self) -> &str {
        "mock"
    }
}
