//! Mock catalog source for testing: serves pre-loaded entries.

use async_trait::async_trait;
use pl_protocol::catalog::CatalogEntry;

use crate::error::CatalogResult;
use crate::source::CatalogSource;

/// A catalog source that serves entries held in memory.
pub struct MockCatalogSource {
    entries: Vec<CatalogEntry>,
}

impl MockCatalogSource {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Add one entry at the end of the catalog.
    pub fn add_entry(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// Create a mock with a small but realistic catalog: national services,
    /// a two-region CUP and per-region health records.
    pub fn with_sample_catalog() -> Self {
        Self::with_entries(vec![
            CatalogEntry::new(
                "bollo_auto",
                "calcolo_bollo",
                "national",
                "Calcolo bollo auto",
                "https://www.agenziaentrate.gov.it/portale/calcolo-bollo-auto",
            ),
            CatalogEntry::new(
                "bollo_auto",
                "pagamento",
                "national",
                "Pagamento bollo auto",
                "https://www.pagopa.gov.it/it/cittadini/dove-pagare",
            )
            .with_notes("Puoi pagare con PagoPA, in banca o dal tabaccaio."),
            CatalogEntry::new(
                "cup",
                "prenotazione",
                "Lombardia",
                "Prenota visite in Lombardia",
                "https://www.prenotasalute.regione.lombardia.it",
            ),
            CatalogEntry::new(
                "cup",
                "prenotazione",
                "Lazio",
                "Recup Lazio",
                "https://www.salutelazio.it/prenota",
            ),
            CatalogEntry::new(
                "fascicolo_sanitario",
                "",
                "Lombardia",
                "Fascicolo Sanitario Lombardia",
                "https://www.fascicolosanitario.regione.lombardia.it",
            ),
            CatalogEntry::new(
                "fascicolo_sanitario",
                "",
                "Emilia-Romagna",
                "Fascicolo Sanitario Emilia-Romagna",
                "https://support.fascicolo-sanitario.it",
            ),
            CatalogEntry::new(
                "fascicolo_sanitario",
                "",
                "national",
                "Fascicolo Sanitario Elettronico",
                "https://www.fascicolosanitario.gov.it",
            ),
            CatalogEntry::new(
                "patente",
                "rinnovo",
                "national",
                "Rinnovo patente",
                "https://www.ilportaledellautomobilista.it",
            ),
            CatalogEntry::new(
                "spid",
                "",
                "national",
                "Richiedi SPID",
                "https://www.spid.gov.it/cos-e-spid/come-attivare-spid",
            ),
            CatalogEntry::new(
                "cie",
                "",
                "national",
                "Carta d'identità elettronica",
                "https://www.cartaidentita.interno.gov.it",
            ),
            CatalogEntry::new(
                "anpr",
                "certificati",
                "national",
                "Certificati anagrafici ANPR",
                "https://www.anagrafenazionale.interno.it/servizi-al-cittadino",
            ),
            CatalogEntry::new(
                "io_app",
                "",
                "national",
                "App IO",
                "https://io.italia.it",
            ),
            CatalogEntry::new(
                "tari",
                "",
                "national",
                "TARI: tassa rifiuti",
                "https://www.mef.gov.it",
            ),
        ])
    }
}

impl Default for MockCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn load(&self) -> CatalogResult<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
