//! Signal model: a post in the "signals" feed, made of ordered content blocks.

use serde::{Deserialize, Serialize};

use crate::db::{Collection, Record};

/// Publication status of a signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    #[default]
    Draft,
    Published,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Draft => "draft",
            SignalStatus::Published => "published",
        }
    }
}

/// Kind of content block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Markdown-subset text
    Text,
    /// Image URL
    Image,
    /// Canonical embed player URL
    Embed,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Embed => "embed",
        }
    }
}

/// One block of a signal's body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignalBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl SignalBlock {
    /// Create a block with a fresh id.
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
            caption: None,
        }
    }
}

/// A blog-like post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Display date, usually `DD/MM/YYYY`; not sortable as-is
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: SignalStatus,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub blocks: Vec<SignalBlock>,
}

impl Signal {
    /// A new draft holding a single empty text block.
    pub fn empty() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: String::new(),
            subtitle: String::new(),
            date: String::new(),
            status: SignalStatus::Draft,
            views: 0,
            blocks: vec![SignalBlock::new(BlockKind::Text, "")],
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == SignalStatus::Published
    }

    pub fn block_index(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }
}

impl Record for Signal {
    const COLLECTION: Collection = Collection::Signals;

    fn id(&self) -> &str {
        &self.id
    }
}
