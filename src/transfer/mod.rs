//! Export and import of the whole store as one JSON document.

use std::path::Path;

use chrono::Utc;
use serde_json::Value;

use crate::db::{Collection, LocalStore};
use crate::errors::AppError;
use crate::models::{ExportBundle, ImportSummary, EXPORT_FORMAT};

/// Dump all three collections.
pub async fn export(store: &LocalStore) -> Result<ExportBundle, AppError> {
    let bundle = ExportBundle {
        format: EXPORT_FORMAT,
        exported_at: Some(Utc::now()),
        works: store.get_all_raw(Collection::Works).await?,
        signals: store.get_all_raw(Collection::Signals).await?,
        about: store.get_all_raw(Collection::About).await?,
    };

    tracing::info!(
        "Exported {} works, {} signals, {} about records",
        bundle.works.len(),
        bundle.signals.len(),
        bundle.about.len()
    );

    Ok(bundle)
}

/// Write a pretty-printed export to `path`.
pub async fn export_to_path(store: &LocalStore, path: &Path) -> Result<ExportBundle, AppError> {
    let bundle = export(store).await?;
    let json = serde_json::to_string_pretty(&bundle)?;
    tokio::fs::write(path, json).await?;
    Ok(bundle)
}

/// Parse an uploaded export. Nothing is written when this fails.
pub fn parse_bundle(raw: &str) -> Result<ExportBundle, AppError> {
    serde_json::from_str(raw).map_err(|e| AppError::Import(format!("Invalid export file: {}", e)))
}

/// Upsert every record of the bundle, collection by collection.
pub async fn import(store: &LocalStore, bundle: &ExportBundle) -> Result<ImportSummary, AppError> {
    let mut skipped = 0;
    let works = import_collection(store, Collection::Works, &bundle.works, &mut skipped).await?;
    let signals =
        import_collection(store, Collection::Signals, &bundle.signals, &mut skipped).await?;
    let about = import_collection(store, Collection::About, &bundle.about, &mut skipped).await?;

    let summary = ImportSummary {
        works,
        signals,
        about,
        skipped,
    };

    tracing::info!(
        "Imported {} records ({} works, {} signals, {} about), skipped {}",
        summary.total(),
        summary.works,
        summary.signals,
        summary.about,
        summary.skipped
    );

    Ok(summary)
}

/// Read, parse and import an export file.
pub async fn import_from_path(store: &LocalStore, path: &Path) -> Result<ImportSummary, AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Import(format!("Cannot read {}: {}", path.display(), e)))?;
    let bundle = parse_bundle(&raw)?;
    import(store, &bundle).await
}

async fn import_collection(
    store: &LocalStore,
    collection: Collection,
    documents: &[Value],
    skipped: &mut usize,
) -> Result<usize, AppError> {
    let mut written = 0;

    for document in documents {
        if !has_id(document) {
            tracing::warn!("Skipping {} document without id", collection);
            *skipped += 1;
            continue;
        }
        store.save_raw(collection, document).await?;
        written += 1;
    }

    Ok(written)
}

fn has_id(document: &Value) -> bool {
    document
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bundle_defaults_missing_collections() {
        let bundle = parse_bundle(r#"{"works":[{"id":"w1","title":"x"}]}"#).unwrap();
        assert_eq!(bundle.works.len(), 1);
        assert!(bundle.signals.is_empty());
        assert!(bundle.about.is_empty());
        assert_eq!(bundle.format, EXPORT_FORMAT);
    }

    #[test]
    fn test_parse_bundle_rejects_garbage() {
        let err = parse_bundle("not json").unwrap_err();
        assert!(matches!(err, AppError::Import(_)));
    }

    #[test]
    fn test_has_id() {
        assert!(has_id(&json!({"id": "a"})));
        assert!(!has_id(&json!({"id": ""})));
        assert!(!has_id(&json!({"id": 3})));
        assert!(!has_id(&json!({"title": "x"})));
    }
}
