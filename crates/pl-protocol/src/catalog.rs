use serde::{Deserialize, Serialize};

/// Region sentinel for entries valid everywhere in the country.
pub const NATIONAL_REGION: &str = "national";

/// Italian spelling of the national sentinel, accepted in catalog files.
pub const NATIONAL_REGION_IT: &str = "Nazionale";

/// A single public-service link in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Top-level service category (e.g., "bollo_auto").
    pub intent: String,
    /// Specific action within the intent (e.g., "calcolo_bollo"). Empty acts as a wildcard.
    #[serde(default)]
    pub sub_intent: String,
    /// "national" (or "Nazionale") or a specific region name.
    pub region: String,
    /// Display label for the link.
    pub label: String,
    /// Absolute link to the official service.
    pub url: String,
    /// Free-text notes shown with the link.
    #[serde(default)]
    pub notes: String,
}

impl CatalogEntry {
    pub fn new(
        intent: impl Into<String>,
        sub_intent: impl Into<String>,
        region: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            intent: intent.into(),
            sub_intent: sub_intent.into(),
            region: region.into(),
            label: label.into(),
            url: url.into(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether this entry is scope-independent.
    pub fn is_national(&self) -> bool {
        is_national_region(&self.region)
    }

    /// Region as shown to users (`None` for national entries).
    pub fn region_display(&self) -> Option<&str> {
        if self.is_national() {
            None
        } else {
            Some(self.region.as_str())
        }
    }

    /// Whether this entry belongs to `region` (case-insensitive, national never matches).
    pub fn in_region(&self, region: &str) -> bool {
        !self.is_national() && self.region.eq_ignore_ascii_case(region.trim())
    }
}

/// True for both spellings of the national sentinel, any case.
pub fn is_national_region(region: &str) -> bool {
    let region = region.trim();
    region.eq_ignore_ascii_case(NATIONAL_REGION) || region.eq_ignore_ascii_case(NATIONAL_REGION_IT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_defaults() {
        let json = r#"{
            "intent": "patente",
            "region": "national",
            "label": "Rinnovo patente",
            "url": "https://www.ilportaledellautomobilista.it"
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.sub_intent, "");
        assert_eq!(entry.notes, "");
        assert!(entry.is_national());
    }

    #[test]
    fn national_sentinel_spellings() {
        assert!(is_national_region("national"));
        assert!(is_national_region("Nazionale"));
        assert!(is_national_region(" NATIONAL "));
        assert!(!is_national_region("Lombardia"));
    }

    #[test]
    fn region_display_hides_national() {
        let national = CatalogEntry::new("spid", "", "Nazionale", "SPID", "https://www.spid.gov.it");
        assert_eq!(national.region_display(), None);

        let regional = CatalogEntry::new(
            "cup",
            "",
            "Lazio",
            "Recup Lazio",
            "https://www.salutelazio.it",
        );
        assert_eq!(regional.region_display(), Some("Lazio"));
        assert!(regional.in_region("lazio"));
        assert!(!national.in_region("national"));
    }
}
