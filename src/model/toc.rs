//! Table-of-contents entries.

use serde::{Deserialize, Serialize};

/// Which part of the document a TOC entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionType {
    #[default]
    Main,
    Annex,
}

/// Link from a TOC entry to a body block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocMatch {
    /// Index into the block list
    pub content_idx: usize,
    /// Similarity score, 0 to 100
    pub token_sort_ratio: u32,
}

/// One line of the document's own table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading text, whitespace-normalized
    pub text: String,
    /// Printed page number as arabic digits
    pub page_number: String,
    /// Section identifier such as `"4.1"` or `"IV"`
    pub section: Option<String>,
    /// Nesting depth as derived by the extracting strategy; 0 when unnumbered
    pub section_level: u32,
    pub section_type: SectionType,
    /// Section identifier of the parent entry
    pub parent_section: Option<String>,
    /// Filled in by the matcher
    pub toc_match: Option<TocMatch>,
}

impl TocEntry {
    /// Unnumbered, unmatched entry.
    pub fn new(text: impl Into<String>, page_number: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_number: page_number.into(),
            section: None,
            section_level: 0,
            section_type: SectionType::Main,
            parent_section: None,
            toc_match: None,
        }
    }

    /// Numeric value of the page number.
    pub fn page_value(&self) -> Option<u32> {
        self.page_number.parse().ok()
    }
}
