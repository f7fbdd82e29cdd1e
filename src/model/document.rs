//! Document-level types.

use super::{Block, BlockType, Footnote, PageNumberSequence, SizeTagTable, TocEntry};
use serde::{Deserialize, Serialize};

/// Result of parsing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document name (file stem)
    pub name: String,

    /// Number of pages
    pub page_count: usize,

    /// Reconstructed blocks in reading order
    pub blocks: Vec<Block>,

    /// Table of contents, possibly empty
    pub toc: Vec<TocEntry>,

    /// Accepted page-number sequence
    pub page_numbers: PageNumberSequence,

    /// Footnote anchors and definitions
    pub footnotes: Vec<Footnote>,

    /// Font size classification
    pub size_tags: SizeTagTable,

    /// Per-stage counts
    pub stats: DocumentStats,
}

impl ParsedDocument {
    /// Blocks of one type.
    pub fn blocks_of(&self, block_type: BlockType) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(move |b| b.block_type == block_type)
    }

    /// Blocks on one page.
    pub fn page_blocks(&self, page_id: usize) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.page_id == page_id)
    }

    /// Whether a table of contents was found.
    pub fn has_toc(&self) -> bool {
        !self.toc.is_empty()
    }

    /// Plain text of all body blocks.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.block_type.is_body())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Counts gathered while parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub pages: usize,
    pub spans: usize,
    pub size_tags: usize,
    pub page_numbers: usize,
    pub footnotes: usize,
    pub blocks: usize,
    pub toc_entries: usize,
    /// Sum of match scores over 100 × entries; 0 without a TOC
    pub toc_accuracy: f64,
}

impl DocumentStats {
    /// Mean TOC match score scaled to 0..=1.
    pub fn accuracy(toc: &[TocEntry]) -> f64 {
        if toc.is_empty() {
            return 0.0;
        }
        let total: u32 = toc
            .iter()
            .filter_map(|e| e.toc_match)
            .map(|m| m.token_sort_ratio)
            .sum();
        f64::from(total) / (100.0 * toc.len() as f64)
    }
}
