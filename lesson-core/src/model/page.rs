use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BlockData, ContentBlock, RawBlock};
use crate::normalize;

/// A lesson page: a titled, ordered list of content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "normalize::deserialize_blocks")]
    pub blocks: Vec<ContentBlock>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            blocks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a page from stored blocks, normalizing them on the way in
    pub fn from_blocks(title: String, blocks: Vec<RawBlock>) -> Self {
        let mut page = Self::new(title);
        page.blocks = normalize::normalize(blocks);
        page
    }

    /// Replace the block list (already normalized by its owner)
    pub fn set_blocks(&mut self, blocks: Vec<ContentBlock>) {
        self.blocks = blocks;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn exercise_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.data, BlockData::Exercise(_)))
            .count()
    }

    pub fn question_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| match &b.data {
                BlockData::Exercise(e) => e.questions.len(),
                _ => 0,
            })
            .sum()
    }
}
