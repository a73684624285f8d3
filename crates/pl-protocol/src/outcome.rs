use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::classification::SmalltalkKind;

/// What the resolver decided for one request. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// One best entry (never empty).
    Matched(Vec<CatalogEntry>),
    /// Two or more entries tied at the top rank.
    Ambiguous(Vec<CatalogEntry>),
    /// A service was requested but nothing in the catalog fits.
    NoMatch,
    Smalltalk(SmalltalkKind),
    OffTopic,
}

impl ResolutionOutcome {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionOutcome::Matched(_) => "matched",
            ResolutionOutcome::Ambiguous(_) => "ambiguous",
            ResolutionOutcome::NoMatch => "no_match",
            ResolutionOutcome::Smalltalk(_) => "smalltalk",
            ResolutionOutcome::OffTopic => "off_topic",
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        match self {
            ResolutionOutcome::Matched(entries) | ResolutionOutcome::Ambiguous(entries) => entries,
            _ => &[],
        }
    }
}
