//! E2E tests for loading the catalog file the service starts from.

use std::io::Write;

use pl_catalog::{CatalogError, CatalogLookup, FileCatalogSource, load_index};
use tempfile::NamedTempFile;

fn write_catalog(json: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn e2e_catalog_file_loads_and_resolves() {
    let file = write_catalog(&serde_json::json!([
        {
            "intent": "tari",
            "region": "Nazionale",
            "label": "TARI",
            "url": "https://www.mef.gov.it/tari"
        },
        {
            "intent": "cup",
            "sub_intent": "prenotazione",
            "region": "Toscana",
            "label": "CUP Toscana",
            "url": "https://prenota.sanita.toscana.it",
            "notes": "Serve la ricetta elettronica."
        }
    ]));

    let index = load_index(&FileCatalogSource::new(file.path().to_string_lossy()))
        .await
        .unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index.regions(), ["Toscana"]);
    let entries = index.lookup("tari", None, Some("Toscana"));
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_national());
}

#[tokio::test]
async fn e2e_duplicate_key_fails_startup() {
    let entry = serde_json::json!({
        "intent": "spid",
        "region": "national",
        "label": "SPID",
        "url": "https://www.spid.gov.it"
    });
    let file = write_catalog(&serde_json::json!([entry.clone(), entry]));

    let err = load_index(&FileCatalogSource::new(file.path().to_string_lossy()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateKey { .. }), "got {err:?}");
}

#[tokio::test]
async fn e2e_malformed_catalog_fails_startup() {
    let file = write_catalog(&serde_json::json!({"intent": "not an array"}));
    let err = load_index(&FileCatalogSource::new(file.path().to_string_lossy()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)), "got {err:?}");

    let missing = load_index(&FileCatalogSource::new("/nonexistent/catalog.json"))
        .await
        .unwrap_err();
    assert!(matches!(missing, CatalogError::NotFound(_)), "got {missing:?}");
}
