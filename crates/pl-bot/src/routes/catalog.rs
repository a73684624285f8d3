//! Catalog statistics endpoint.

use axum::Json;
use axum::extract::State;
use pl_catalog::CatalogStats;
use serde::Serialize;

use crate::state::AppState;

/// Response body for GET /api/v1/catalog.
#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    #[serde(flatten)]
    pub stats: CatalogStats,
    /// Region display names, national excluded.
    pub region_names: Vec<String>,
    pub intent_names: Vec<String>,
}

/// GET /api/v1/catalog: entry counts and coverage per intent.
pub async fn catalog_stats(State(state): State<AppState>) -> Json<CatalogSummary> {
    Json(CatalogSummary {
        stats: state.catalog.stats(),
        region_names: state.catalog.regions(),
        intent_names: state.catalog.intents(),
    })
}
