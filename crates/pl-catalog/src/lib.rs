//! Public-service link catalog.
//!
//! - `CatalogIndex`: immutable index built once at startup, ranked lookup
//! - `CatalogSource` trait with file and mock backends
//! - `RegionNormalizer` for free-text region mentions

pub mod error;
pub mod index;
pub mod mock;
pub mod regions;
pub mod source;

pub use error::{CatalogError, CatalogResult};
pub use index::{
    CatalogIndex, CatalogLookup, CatalogStats, IntentCoverage, IntentVocabulary, Rank, RankedEntry,
    top_rank_group,
};
pub use mock::MockCatalogSource;
pub use regions::RegionNormalizer;
pub use source::{CatalogSource, FileCatalogSource, load_index};
