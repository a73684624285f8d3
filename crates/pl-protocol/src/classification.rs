use serde::{Deserialize, Serialize};

/// Top-level category assigned to an utterance by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The user asks for a public service link.
    ServiceRequest,
    /// Greetings, thanks, "how are you", help and "who are you" questions.
    Smalltalk,
    /// Neither smalltalk nor a recognizable service request.
    OffTopic,
    /// The classifier could not decide (or its output was rejected).
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ServiceRequest,
        Category::Smalltalk,
        Category::OffTopic,
        Category::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ServiceRequest => "service_request",
            Category::Smalltalk => "smalltalk",
            Category::OffTopic => "off_topic",
            Category::Unclassified => "unclassified",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

/// Flavour of a smalltalk utterance, used to pick the reply template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmalltalkKind {
    Greeting,
    #[default]
    Chitchat,
    Help,
    About,
}

impl SmalltalkKind {
    pub const ALL: [SmalltalkKind; 4] = [
        SmalltalkKind::Greeting,
        SmalltalkKind::Chitchat,
        SmalltalkKind::Help,
        SmalltalkKind::About,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SmalltalkKind::Greeting => "greeting",
            SmalltalkKind::Chitchat => "chitchat",
            SmalltalkKind::Help => "help",
            SmalltalkKind::About => "about",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == label)
    }
}

/// Classifier output for a single utterance. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_intent: Option<String>,
    /// Region mentioned in the utterance, as written by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub smalltalk_kind: SmalltalkKind,
    /// Classifier confidence (0.0 - 1.0).
    pub confidence: f64,
}

impl ClassificationResult {
    /// The "no idea" result: unclassified with zero confidence.
    pub fn unclassified() -> Self {
        Self {
            category: Category::Unclassified,
            intent: None,
            sub_intent: None,
            region: None,
            smalltalk_kind: SmalltalkKind::default(),
            confidence: 0.0,
        }
    }

    pub fn service(
        intent: impl Into<String>,
        sub_intent: Option<&str>,
        confidence: f64,
    ) -> Self {
        Self {
            category: Category::ServiceRequest,
            intent: Some(intent.into()),
            sub_intent: sub_intent.map(str::to_string),
            confidence,
            ..Self::unclassified()
        }
    }

    pub fn smalltalk(kind: SmalltalkKind, confidence: f64) -> Self {
        Self {
            category: Category::Smalltalk,
            smalltalk_kind: kind,
            confidence,
            ..Self::unclassified()
        }
    }

    pub fn off_topic(confidence: f64) -> Self {
        Self {
            category: Category::OffTopic,
            confidence,
            ..Self::unclassified()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Apply the minimum-confidence policy.
    ///
    /// Anything below `min_confidence` becomes `unclassified`, whatever intent
    /// was extracted. `confidence == min_confidence` passes.
    pub fn gated(self, min_confidence: f64) -> Self {
        if self.category == Category::Unclassified {
            return self;
        }
        if self.confidence.is_nan() || self.confidence < min_confidence {
            return Self {
                confidence: if self.confidence.is_nan() {
                    0.0
                } else {
                    self.confidence
                },
                ..Self::unclassified()
            };
        }
        self
    }
}
