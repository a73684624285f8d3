//! Shared test harness for E2E integration tests.
//!
//! Wires the real catalog, pipeline, dispatcher and router together; only
//! the classifier is swapped (scripted mock, or the real Ollama tier
//! pointed at a wiremock server).

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pl_bot::config::BotConfig;
use pl_bot::pipeline::build_classifier;
use pl_bot::routes::build_router;
use pl_bot::state::AppState;
use pl_catalog::{CatalogIndex, MockCatalogSource, load_index};
use pl_inference::{IntentClassifier, OllamaConfig};
use pl_protocol::CatalogEntry;

/// End-to-end harness: HTTP router over the full resolution stack.
pub struct TestHarness {
    pub state: AppState,
    pub router: Router,
    pub config: BotConfig,
}

impl TestHarness {
    /// Sample catalog (13 entries) with the given classifier.
    pub async fn with_classifier(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self::build(sample_catalog().await, classifier, BotConfig::default())
    }

    /// Custom catalog with the given classifier.
    pub fn with_catalog(entries: Vec<CatalogEntry>, classifier: Arc<dyn IntentClassifier>) -> Self {
        let catalog = CatalogIndex::build(entries).unwrap();
        Self::build(catalog, classifier, BotConfig::default())
    }

    /// Sample catalog with the production classifier stack, its LLM tier
    /// pointed at `ollama_uri`.
    pub async fn with_ollama(ollama_uri: &str, timeout_secs: u64) -> Self {
        let config = BotConfig {
            ollama: OllamaConfig {
                host: ollama_uri.to_string(),
                model: "llama3.1:8b".into(),
                timeout_secs,
                enabled: true,
            },
            ..BotConfig::default()
        };
        let catalog = sample_catalog().await;
        let classifier = build_classifier(&config, &catalog).unwrap();
        Self::build(catalog, classifier, config)
    }

    fn build(catalog: CatalogIndex, classifier: Arc<dyn IntentClassifier>, config: BotConfig) -> Self {
        let state = AppState::build(&config, Arc::new(catalog), classifier);
        let router = build_router(state.clone());
        Self {
            state,
            router,
            config,
        }
    }

    /// POST /api/v1/messages. Returns (HTTP status code, response JSON body).
    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        locale: Option<&str>,
        region: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "text": text,
            "locale": locale,
            "region": region,
        });

        let response = self
            .router
            .clone()
            .oneshot(
                Request::post("/api/v1/messages")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    /// Send an Italian message with no hints and expect 200.
    pub async fn ask(&self, conversation_id: &str, text: &str) -> serde_json::Value {
        let (status, json) = self.send_message(conversation_id, text, None, None).await;
        assert_eq!(status, StatusCode::OK, "unexpected status for {text:?}: {json}");
        json
    }

    /// GET a path and return (status, JSON body).
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}

pub async fn sample_catalog() -> CatalogIndex {
    load_index(&MockCatalogSource::with_sample_catalog())
        .await
        .unwrap()
}

/// Ollama `/api/chat` reply whose message content is `content`.
pub fn ollama_chat_response(content: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "model": "llama3.1:8b",
        "message": {
            "role": "assistant",
            "content": content.to_string()
        },
        "done": true
    })
}
