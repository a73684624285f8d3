//! Catalog source abstraction: read catalog entries from files, mocks, or other backends.

use async_trait::async_trait;
use pl_protocol::catalog::CatalogEntry;

use crate::error::{CatalogError, CatalogResult};
use crate::index::CatalogIndex;

/// Where catalog entries come from.
///
/// Read once at startup; the index built from it is never reloaded.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load every entry, in catalog order.
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// Reads a JSON array of entries from the local filesystem.
pub struct FileCatalogSource {
    path: String,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CatalogError::NotFound(self.path.clone())
            } else {
                CatalogError::Io(format!("{}: {e}", self.path))
            }
        })?;

        serde_json::from_str::<Vec<CatalogEntry>>(&content)
            .map_err(|e| CatalogError::Parse(format!("{}: {e}", self.path)))
    }

    fn describe(&self) -> String {
        self.path.clone()
    }
}

/// Load entries from `source` and build the index.
pub async fn load_index(source: &dyn CatalogSource) -> CatalogResult<CatalogIndex> {
    let entries = source.load().await?;
    let index = CatalogIndex::build(entries)?;

    let stats = index.stats();
    tracing::info!(
        source = %source.describe(),
        entries = stats.total_entries,
        intents = stats.intents,
        regions = stats.regions,
        "Catalog loaded"
    );
    for coverage in stats.coverage.iter().filter(|c| c.national == 0) {
        tracing::debug!(
            intent = %coverage.intent,
            regional = coverage.regional,
            "Intent has no national entry"
        );
    }

    Ok(index)
}
