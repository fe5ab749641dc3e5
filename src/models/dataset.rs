//! Whole-store documents: the bundled seed dataset and the export bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AboutData, ConnectConfig, Signal, Work};

/// Default content shipped with the site.
///
/// `last_updated` gates the one-way sync into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDataset {
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub works: Vec<Work>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<AboutData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<ConnectConfig>,
}

/// Current export file format.
pub const EXPORT_FORMAT: u32 = 1;

fn export_format() -> u32 {
    EXPORT_FORMAT
}

/// Full dump of the three collections.
///
/// Records stay raw JSON so a dump survives documents this build cannot type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default = "export_format")]
    pub format: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub works: Vec<serde_json::Value>,
    #[serde(default)]
    pub signals: Vec<serde_json::Value>,
    #[serde(default)]
    pub about: Vec<serde_json::Value>,
}

/// Counts of records written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub works: usize,
    pub signals: usize,
    pub about: usize,
    /// Documents without a string `id`
    pub skipped: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.works + self.signals + self.about
    }
}
