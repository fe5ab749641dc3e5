//! Work model: one piece in the portfolio.

use serde::{Deserialize, Serialize};

use crate::db::{Collection, Record};

/// Kind of media in a work's gallery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// One item of a work's gallery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// An art piece.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub month: String,
    /// ISO `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<GalleryItem>>,
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl Record for Work {
    const COLLECTION: Collection = Collection::Works;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Backoffice form for creating or editing a work.
///
/// A missing `id` creates a new work; a missing `slug` is derived from the title.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkForm {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub gallery: Option<Vec<GalleryItem>>,
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Lowercase ASCII slug: accents folded, runs of other characters collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(c);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Ruídos Atmosféricos #3"), "ruidos-atmosfericos-3");
        assert_eq!(slugify("  --Ação--  "), "acao");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_work_defaults_from_sparse_json() {
        let work: Work = serde_json::from_str(r#"{"id":"w1","title":"x"}"#).unwrap();
        assert!(work.is_visible);
        assert!(!work.is_featured);
        assert_eq!(work.views, 0);
        assert!(work.gallery.is_none());
    }

    #[test]
    fn test_gallery_item_type_field() {
        let item: GalleryItem =
            serde_json::from_str(r#"{"type":"video","url":"https://v.example/a.mp4"}"#).unwrap();
        assert_eq!(item.kind, MediaKind::Video);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "video");
        assert!(json.get("caption").is_none());
    }
}
