//! Ollama LLM classifier.
//!
//! Calls the Ollama HTTP API (`/api/chat`) with a JSON-schema `format` so
//! the model replies with a single classification object. The reply is
//! validated by `schema::parse_classification`; anything that fails
//! validation becomes `unclassified`. Transport failures and timeouts are
//! errors, never "no match".

use std::time::Duration;

use async_trait::async_trait;
use pl_protocol::{ClassificationResult, Language};
use serde::{Deserialize, Serialize};

use crate::IntentClassifier;
use crate::error::{ClassifierError, ClassifierResult};
use crate::prompt::{PromptContext, build_system_prompt};
use crate::schema;

/// Configuration for the Ollama inference endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    /// Ollama HTTP API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// Model to use for inference.
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether the LLM tier is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.1:8b".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_enabled() -> bool {
    true
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            enabled: default_enabled(),
        }
    }
}

/// Ollama chat API request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: serde_json::Value,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Ollama chat API response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Classifier backed by an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaClassifier {
    client: reqwest::Client,
    config: OllamaConfig,
    context: PromptContext,
}

impl OllamaClassifier {
    pub fn new(config: OllamaConfig, context: PromptContext) -> ClassifierResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Unavailable(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            config,
            context,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout_secs.saturating_mul(1000)
    }

    async fn call_chat(&self, text: &str, language: Language) -> ClassifierResult<ClassificationResult> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let system_prompt = build_system_prompt(&self.context, language);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            format: schema::response_format(),
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout {
                    timeout_ms: self.timeout_ms(),
                }
            } else {
                ClassifierError::Unavailable(format!("ollama request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "ollama returned {status}"
            )));
        }

        let chat_resp: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout {
                    timeout_ms: self.timeout_ms(),
                }
            } else {
                ClassifierError::Unavailable(format!("unreadable ollama response: {e}"))
            }
        })?;

        let content = chat_resp
            .message
            .map(|m| m.content)
            .ok_or_else(|| ClassifierError::Unavailable("ollama response has no message".into()))?;

        match schema::parse_classification(&content) {
            Ok(result) => Ok(result),
            Err(violation) => {
                tracing::warn!(error = %violation, content = %content, "ollama reply violates schema");
                Ok(ClassificationResult::unclassified())
            }
        }
    }
}

#[async_trait]
impl IntentClassifier for OllamaClassifier {
    async fn classify(
        &self,
        text: &str,
        language: Language,
    ) -> ClassifierResult<ClassificationResult> {
        let limit = Duration::from_secs(self.config.timeout_secs);

        let result = match tokio::time::timeout(limit, self.call_chat(text, language)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout {
                timeout_ms: self.timeout_ms(),
            }),
        };

        match &result {
            Ok(classification) => tracing::debug!(
                category = classification.category.as_str(),
                intent = classification.intent.as_deref().unwrap_or("-"),
                confidence = classification.confidence,
                "ollama classified"
            ),
            Err(e) => tracing::warn!(error = %e, model = %self.config.model, "ollama inference failed"),
        }
        result
    }

    fn tier_name(&self) -> &str {
        "ollama"
    }
}
