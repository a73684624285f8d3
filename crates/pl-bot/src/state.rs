//! Shared application state for the Axum server.

use std::sync::Arc;

use pl_catalog::CatalogIndex;
use pl_inference::IntentClassifier;

use crate::config::BotConfig;
use crate::dispatcher::ConversationDispatcher;
use crate::pipeline::Pipeline;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Ordered, per-conversation entry point to the pipeline.
    pub dispatcher: Arc<ConversationDispatcher>,
    /// Read-only catalog, for stats and health.
    pub catalog: Arc<CatalogIndex>,
}

impl AppState {
    pub fn new(dispatcher: Arc<ConversationDispatcher>, catalog: Arc<CatalogIndex>) -> Self {
        Self {
            dispatcher,
            catalog,
        }
    }

    /// Wire pipeline and dispatcher over `catalog` and `classifier`.
    pub fn build(
        config: &BotConfig,
        catalog: Arc<CatalogIndex>,
        classifier: Arc<dyn IntentClassifier>,
    ) -> Self {
        let pipeline = Pipeline::new(config, catalog.clone(), classifier);
        let dispatcher = ConversationDispatcher::new(Arc::new(pipeline));
        Self::new(Arc::new(dispatcher), catalog)
    }
}
