//! Reconstructed logical blocks.

use super::{BBox, SizeTag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a block in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Body paragraph
    Text,
    /// Heading (header size tag)
    Header,
    /// Printed page number
    PageNumber,
    /// In-body footnote anchor
    FootnoteId,
    /// Footnote body text
    FootnoteText,
    /// Page-bottom footnote marker that starts a footnote definition
    FootnoteTextId,
    /// Text lying in the table-of-contents region
    TocOrigText,
}

impl BlockType {
    /// Blocks that further spans may be appended to.
    pub fn is_continuable(&self) -> bool {
        matches!(
            self,
            BlockType::Text | BlockType::Header | BlockType::FootnoteText
        )
    }

    /// Blocks that carry document body content.
    pub fn is_body(&self) -> bool {
        matches!(self, BlockType::Text | BlockType::Header)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Header => "header",
            BlockType::PageNumber => "page_number",
            BlockType::FootnoteId => "footnote_id",
            BlockType::FootnoteText => "footnote_text",
            BlockType::FootnoteTextId => "footnote_text_id",
            BlockType::TocOrigText => "toc_orig_text",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical unit built by merging spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub text: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Size tag of the first span
    pub tag: SizeTag,
    /// Effective font size
    pub size: f32,
    /// Fill color as 0xRRGGBB
    pub color: u32,
    pub page_id: usize,
    /// Outer envelope of all merged spans
    pub bbox: BBox,
    /// Tags of every merged span, in order
    #[serde(with = "merged_tags")]
    pub merged_tags: Vec<SizeTag>,
    /// Character offset where a footnote anchor sat in the stitched paragraph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote_id_pos: Option<usize>,
    /// Block index of the first span within its page
    #[serde(skip)]
    pub block_id: usize,
    /// Line index of the first span within its block
    #[serde(skip)]
    pub line_id: usize,
    /// Byte offsets of source line breaks
    #[serde(skip)]
    pub line_breaks: Vec<usize>,
}

impl Block {
    /// Start a block from its first span's attributes.
    pub fn new(
        text: impl Into<String>,
        block_type: BlockType,
        tag: SizeTag,
        size: f32,
        page_id: usize,
        bbox: BBox,
    ) -> Self {
        Self {
            text: text.into(),
            block_type,
            tag,
            size,
            color: 0,
            page_id,
            bbox,
            merged_tags: vec![tag],
            footnote_id_pos: None,
            block_id: 0,
            line_id: 0,
            line_breaks: Vec::new(),
        }
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// `merged_tags` travels as one string, e.g. `"<p>_<s1>"`.
mod merged_tags {
    use super::SizeTag;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tags: &[SizeTag], serializer: S) -> Result<S::Ok, S::Error> {
        let joined = tags
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("_");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SizeTag>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split('_')
            .map(|t| t.parse().map_err(D::Error::custom))
            .collect()
    }
}
