//! Table-of-contents extraction.
//!
//! Strategies are tried in order until one yields entries. Every strategy
//! reports the blocks it read as TOC text; those are retyped
//! [`BlockType::TocOrigText`] whether or not entries came out of them.

mod dot_leader;
mod heading_list;

pub use dot_leader::{DotLeaderParser, DotLeaderStrategy};
pub use heading_list::HeadingListStrategy;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Block, BlockType, PageNumberSequence, TocEntry};

use super::options::Thresholds;
use super::text::parse_roman;

/// Leading section number such as `"4.1"` or `"2."`.
static SECTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+\.?)+").expect("valid section number regex"));

/// Leading word made of roman numeral letters.
static ROMAN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([MDCLXVI]+)\b").expect("valid roman word regex"));

/// What a strategy found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocOutcome {
    pub entries: Vec<TocEntry>,
    /// Indices of blocks read as TOC text
    pub retyped: Vec<usize>,
}

/// One way of locating and parsing a table of contents.
pub trait TocStrategy {
    fn name(&self) -> &'static str;

    fn extract(&self, blocks: &[Block], page_numbers: &PageNumberSequence) -> TocOutcome;
}

/// Runs the strategies in sequence.
pub struct TocExtractor {
    strategies: Vec<Box<dyn TocStrategy + Send + Sync>>,
}

impl TocExtractor {
    /// Dot leaders first, then a heading list under a "Table of Contents" title.
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            strategies: vec![
                Box::new(DotLeaderStrategy::new(thresholds.toc_page_limit)),
                Box::new(HeadingListStrategy::new(thresholds.toc_page_limit)),
            ],
        }
    }

    /// Use a custom strategy list.
    pub fn with_strategies(strategies: Vec<Box<dyn TocStrategy + Send + Sync>>) -> Self {
        Self { strategies }
    }

    /// Extract the TOC and retype the blocks it was read from.
    ///
    /// Returns [`Error::TocNotFound`] when no strategy yields entries; the
    /// retyping of every attempted strategy still applies.
    pub fn extract(
        &self,
        blocks: &mut [Block],
        page_numbers: &PageNumberSequence,
    ) -> Result<Vec<TocEntry>> {
        for strategy in &self.strategies {
            let outcome = strategy.extract(blocks, page_numbers);
            for idx in outcome.retyped {
                if let Some(block) = blocks.get_mut(idx) {
                    block.block_type = BlockType::TocOrigText;
                }
            }
            if !outcome.entries.is_empty() {
                log::debug!("{} toc entries via {}", outcome.entries.len(), strategy.name());
                return Ok(outcome.entries);
            }
        }
        Err(Error::TocNotFound)
    }
}

/// Trimmed, non-empty source lines of a block.
pub fn block_lines(block: &Block) -> Vec<&str> {
    let text = block.text.as_str();
    let mut bounds = Vec::with_capacity(block.line_breaks.len() + 2);
    bounds.push(0);
    bounds.extend(block.line_breaks.iter().copied().filter(|&b| b <= text.len()));
    bounds.push(text.len());

    bounds
        .windows(2)
        .filter_map(|w| text.get(w[0]..w[1]))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Leading arabic section number, as matched (trailing dot included).
fn arabic_section(text: &str) -> Option<&str> {
    SECTION_NUMBER.find(text).map(|m| m.as_str())
}

/// Leading roman numeral word of an upper-case heading.
fn roman_section(text: &str) -> Option<&str> {
    let word = ROMAN_WORD.captures(text)?.get(1)?.as_str();
    parse_roman(word).map(|_| word)
}

fn is_annex(text: &str) -> bool {
    ["Annex", "ANNEX", "Appendix", "APPENDIX"]
        .iter()
        .any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, SizeTag};

    pub(super) fn block(text: &str, page: usize, size: f32) -> Block {
        Block::new(
            text,
            BlockType::Text,
            SizeTag::Paragraph,
            size,
            page,
            BBox::new(72.0, 100.0, 500.0, 100.0 + size),
        )
    }

    /// A block whose lines are joined the way the reconstructor joins them.
    pub(super) fn multiline(lines: &[&str], page: usize, size: f32) -> Block {
        let mut b = block(lines[0], page, size);
        for line in &lines[1..] {
            b.line_breaks.push(b.text.len());
            b.text.push(' ');
            b.text.push_str(line);
        }
        b
    }

    #[test]
    fn test_block_lines() {
        let b = multiline(&["Introduction .... 3", "Scope .... 5"], 1, 10.0);
        assert_eq!(block_lines(&b), vec!["Introduction .... 3", "Scope .... 5"]);

        let single = block("  Only line  ", 0, 10.0);
        assert_eq!(block_lines(&single), vec!["Only line"]);
    }

    #[test]
    fn test_section_prefixes() {
        assert_eq!(arabic_section("4.1 Scope"), Some("4.1"));
        assert_eq!(arabic_section("2. Method"), Some("2."));
        assert_eq!(arabic_section("Method"), None);
        assert_eq!(roman_section("IV. RESULTS"), Some("IV"));
        assert_eq!(roman_section("INTRODUCTION"), None);
        assert_eq!(roman_section("IIII. X"), None);
        assert!(is_annex("Annex 2: Terms of reference"));
        assert!(!is_annex("see the annex list"));
    }

    #[test]
    fn test_not_found_still_retypes() {
        let mut blocks = vec![
            block("Chapter text .... without a page", 0, 10.0),
            block("Plain body", 3, 10.0),
        ];
        let extractor = TocExtractor::new(&Thresholds::default());
        let result = extractor.extract(&mut blocks, &PageNumberSequence::default());

        assert!(matches!(result, Err(Error::TocNotFound)));
        assert_eq!(blocks[0].block_type, BlockType::TocOrigText);
        assert_eq!(blocks[1].block_type, BlockType::Text);
    }

    #[test]
    fn test_falls_back_to_heading_list() {
        let mut blocks = vec![
            block("Table of Contents", 1, 14.0),
            multiline(&["1", "Introduction", "3", "2", "Method", "5"], 1, 10.0),
            block("Introduction", 3, 14.0),
        ];
        let extractor = TocExtractor::new(&Thresholds::default());
        let toc = extractor
            .extract(&mut blocks, &PageNumberSequence::default())
            .unwrap();

        let pages: Vec<_> = toc.iter().map(|e| e.page_number.as_str()).collect();
        assert_eq!(pages, vec!["3", "5"]);
        assert_eq!(blocks[0].block_type, BlockType::Text);
        assert_eq!(blocks[1].block_type, BlockType::TocOrigText);
        assert_eq!(blocks[2].block_type, BlockType::Text);
    }
}
