//! One-way sync of the bundled dataset into the local store.
//!
//! The dataset's `lastUpdated` is compared against the `last_synced` marker in
//! meta; only a strictly newer dataset is written. Sensor counters are never
//! part of a dataset, so re-seeding does not reset them.

use std::path::Path;

use crate::db::LocalStore;
use crate::errors::AppError;
use crate::models::SeedDataset;

/// Dataset compiled into the binary.
const BUNDLED_SEED: &str = include_str!("../../data/seed.json");

/// Result of a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Records were written and the marker moved forward.
    Applied {
        works: usize,
        signals: usize,
        about: usize,
    },
    /// The store already holds this dataset version or a newer one.
    UpToDate,
}

/// Parse the bundled dataset.
pub fn bundled() -> Result<SeedDataset, AppError> {
    parse(BUNDLED_SEED)
}

/// Load a dataset from a file, or the bundled one when no path is given.
pub async fn load(path: Option<&Path>) -> Result<SeedDataset, AppError> {
    match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            parse(&raw)
        }
        None => bundled(),
    }
}

fn parse(raw: &str) -> Result<SeedDataset, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid seed dataset: {}", e)))
}

/// Upsert the dataset when it is newer than the recorded marker (or `force` is set).
pub async fn sync(
    store: &LocalStore,
    dataset: &SeedDataset,
    force: bool,
) -> Result<SeedOutcome, AppError> {
    let marker = store.last_synced().await?;

    if !force {
        if let Some(synced) = marker {
            if dataset.last_updated <= synced {
                tracing::debug!(
                    "Seed dataset {} already applied (marker {})",
                    dataset.last_updated,
                    synced
                );
                return Ok(SeedOutcome::UpToDate);
            }
        }
    }

    for work in &dataset.works {
        store.save(work).await?;
    }
    for signal in &dataset.signals {
        store.save(signal).await?;
    }

    let mut about = 0;
    if let Some(profile) = &dataset.profile {
        store.save(profile).await?;
        about += 1;
    }
    if let Some(connect) = &dataset.connect {
        store.save(connect).await?;
        about += 1;
    }

    store.set_last_synced(dataset.last_updated).await?;

    tracing::info!(
        "Seed dataset {} applied: {} works, {} signals, {} about records",
        dataset.last_updated,
        dataset.works.len(),
        dataset.signals.len(),
        about
    );

    Ok(SeedOutcome::Applied {
        works: dataset.works.len(),
        signals: dataset.signals.len(),
        about,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_dataset_parses() {
        let dataset = bundled().unwrap();
        assert!(!dataset.works.is_empty());
        assert!(!dataset.signals.is_empty());
        assert!(dataset.profile.is_some());
        assert!(dataset.works.iter().all(|w| !w.id.is_empty()));
    }

    #[test]
    fn test_invalid_dataset_is_a_validation_error() {
        let err = parse(r#"{"works": []}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
