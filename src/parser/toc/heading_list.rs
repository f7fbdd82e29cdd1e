//! Tables of contents without dot leaders, found under a "Table of Contents"
//! title. Rows hold a section, a heading and a page number, either on one
//! line or spread over several.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Block, BlockType, PageNumberSequence, SectionType, TocEntry};
use crate::parser::text::{is_digits, normalize_whitespace, parse_roman};

use super::{arabic_section, block_lines, is_annex, roman_section, TocOutcome, TocStrategy};

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^table\s+of\s+contents").expect("valid toc title regex"));

/// Arabic page numbers in a heading list are at most three digits.
const MAX_PAGE_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment {
    Section,
    PageNumber,
    Text,
}

/// Parses the page that carries a "Table of Contents" title.
#[derive(Debug, Clone, Copy)]
pub struct HeadingListStrategy {
    page_limit: usize,
}

impl HeadingListStrategy {
    pub fn new(page_limit: usize) -> Self {
        Self { page_limit }
    }

    /// Index, page and matched title of the first block opening with the title.
    fn anchor<'b>(&self, blocks: &'b [Block]) -> Option<(usize, usize, &'b str)> {
        blocks
            .iter()
            .enumerate()
            .take_while(|(_, b)| b.page_id <= self.page_limit)
            .find_map(|(idx, b)| TITLE.find(&b.text).map(|m| (idx, b.page_id, m.as_str())))
    }
}

impl TocStrategy for HeadingListStrategy {
    fn name(&self) -> &'static str {
        "heading list"
    }

    fn extract(&self, blocks: &[Block], _page_numbers: &PageNumberSequence) -> TocOutcome {
        let Some((start, page_id, title)) = self.anchor(blocks) else {
            return TocOutcome::default();
        };

        let mut parser = HeadingListParser::default();
        let mut retyped = Vec::new();
        for (idx, b) in blocks.iter().enumerate().skip(start) {
            if b.page_id != page_id {
                break;
            }
            if b.block_type == BlockType::PageNumber || b.text == title {
                continue;
            }
            retyped.push(idx);
            for line in block_lines(b) {
                for fragment in row_fragments(line) {
                    parser.push(fragment);
                }
            }
        }

        TocOutcome {
            entries: parser.entries,
            retyped,
        }
    }
}

/// Fragment-at-a-time parser; a page number completes an entry.
#[derive(Debug, Default)]
struct HeadingListParser {
    entries: Vec<TocEntry>,
    prev: Option<Fragment>,
    text: String,
    section: Option<String>,
    section_type: SectionType,
    /// Open sections, shallowest first
    stack: Vec<String>,
}

impl HeadingListParser {
    fn push(&mut self, fragment: &str) {
        let upper = fragment.to_ascii_uppercase();
        let after_page = matches!(self.prev, None | Some(Fragment::PageNumber));

        let section = arabic_section(fragment).or_else(|| roman_section(&upper));
        let kind = match section {
            Some(section) if after_page => {
                self.section = Some(section.trim_end_matches('.').to_string());
                self.text = fragment.to_string();
                Fragment::Section
            }
            _ => match page_value(fragment) {
                Some(page) => {
                    self.complete(page);
                    Fragment::PageNumber
                }
                None => {
                    if !self.text.is_empty() {
                        self.text.push(' ');
                    }
                    self.text.push_str(fragment);
                    Fragment::Text
                }
            },
        };
        self.prev = Some(kind);
    }

    fn complete(&mut self, page: u32) {
        let text = normalize_whitespace(&std::mem::take(&mut self.text));
        let section = self.section.take();

        if is_annex(&text) {
            self.section_type = SectionType::Annex;
        }

        let (level, parent_section) = match &section {
            Some(s) => {
                while self.stack.last().is_some_and(|top| top.len() >= s.len()) {
                    self.stack.pop();
                }
                let parent = self.stack.last().cloned();
                self.stack.push(s.clone());
                (self.stack.len() as u32, parent)
            }
            None => (0, None),
        };

        if text.is_empty() {
            return;
        }
        self.entries.push(TocEntry {
            text,
            page_number: page.to_string(),
            section,
            section_level: level,
            section_type: self.section_type,
            parent_section,
            toc_match: None,
        });
    }
}

/// Split a row into its leading section, heading text and trailing page
/// number. Lines of a single word stay whole; the parser resolves them from
/// context.
fn row_fragments(line: &str) -> Vec<&str> {
    let mut rest = line.trim();
    let mut fragments = Vec::with_capacity(3);

    if let Some((head, tail)) = rest.split_once(char::is_whitespace) {
        if is_section_token(head) {
            fragments.push(head);
            rest = tail.trim_start();
        }
    }

    let mut page = None;
    if let Some((heading, last)) = rest.rsplit_once(char::is_whitespace) {
        if page_value(last).is_some() {
            page = Some(last);
            rest = heading.trim_end();
        }
    }

    if !rest.is_empty() {
        fragments.push(rest);
    }
    fragments.extend(page);
    fragments
}

/// A whole word that is a section number: `"4"`, `"4.1."` or `"IV."`.
fn is_section_token(token: &str) -> bool {
    let bare = token.trim_end_matches('.');
    arabic_section(token).is_some_and(|s| s.len() == token.len())
        || roman_section(token).is_some_and(|s| s.len() == bare.len())
}

/// Value of a fragment that is nothing but a page number.
fn page_value(fragment: &str) -> Option<u32> {
    if is_digits(fragment) {
        if fragment.len() > MAX_PAGE_DIGITS {
            return None;
        }
        return fragment.parse().ok();
    }
    parse_roman(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::toc::tests::{block, multiline};

    fn parse(fragments: &[&str]) -> Vec<TocEntry> {
        let mut parser = HeadingListParser::default();
        for f in fragments {
            parser.push(f);
        }
        parser.entries
    }

    #[test]
    fn test_fragments_build_entries() {
        let toc = parse(&["1", "Introduction", "3", "2", "Method and", "data", "5"]);
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].text, "1 Introduction");
        assert_eq!(toc[0].page_number, "3");
        assert_eq!(toc[0].section.as_deref(), Some("1"));
        assert_eq!(toc[1].text, "2 Method and data");
        assert_eq!(toc[1].page_number, "5");
    }

    #[test]
    fn test_level_stack() {
        let toc = parse(&[
            "1", "Background", "2", "1.1", "Context", "2", "1.2", "Scope", "4", "2", "Findings", "6",
        ]);
        let summary: Vec<_> = toc
            .iter()
            .map(|e| (e.section.as_deref(), e.section_level, e.parent_section.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some("1"), 1, None),
                (Some("1.1"), 2, Some("1")),
                (Some("1.2"), 2, Some("1")),
                (Some("2"), 1, None),
            ]
        );
    }

    #[test]
    fn test_unnumbered_and_roman_pages() {
        let toc = parse(&["Foreword", "iii", "Annex: Terms of reference", "40", "Interviews", "44"]);
        assert_eq!(toc[0].page_number, "3");
        assert_eq!(toc[0].section_level, 0);
        assert_eq!(toc[0].section_type, SectionType::Main);
        assert_eq!(toc[1].section_type, SectionType::Annex);
        assert_eq!(toc[2].section_type, SectionType::Annex);
    }

    #[test]
    fn test_long_numbers_are_text() {
        assert_eq!(page_value("12"), Some(12));
        assert_eq!(page_value("2019"), None);
        assert_eq!(page_value("xii"), Some(12));
        assert_eq!(page_value("Intro"), None);
    }

    #[test]
    fn test_row_fragments() {
        assert_eq!(row_fragments("1 Introduction 3"), vec!["1", "Introduction", "3"]);
        assert_eq!(
            row_fragments("4.1. Water and sanitation   12"),
            vec!["4.1.", "Water and sanitation", "12"]
        );
        assert_eq!(row_fragments("IV. Findings xii"), vec!["IV.", "Findings", "xii"]);
        assert_eq!(row_fragments("Foreword iii"), vec!["Foreword", "iii"]);
        assert_eq!(row_fragments("Results of 2019"), vec!["Results of 2019"]);
        assert_eq!(row_fragments("Introduction"), vec!["Introduction"]);
        assert_eq!(row_fragments("3"), vec!["3"]);
    }

    #[test]
    fn test_one_row_per_entry() {
        let blocks = vec![
            block("Table of Contents", 1, 14.0),
            multiline(&["1 Introduction 3", "2 Method 5", "2.1 Sampling 6", "3 Results 8"], 1, 10.0),
        ];
        let outcome = HeadingListStrategy::new(20).extract(&blocks, &PageNumberSequence::default());
        let summary: Vec<_> = outcome
            .entries
            .iter()
            .map(|e| (e.text.as_str(), e.page_number.as_str(), e.section_level, e.parent_section.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1 Introduction", "3", 1, None),
                ("2 Method", "5", 1, None),
                ("2.1 Sampling", "6", 2, Some("2")),
                ("3 Results", "8", 1, None),
            ]
        );
    }

    #[test]
    fn test_strategy_reads_only_the_title_page() {
        let blocks = vec![
            block("Preface", 0, 10.0),
            block("Table of Contents", 1, 14.0),
            multiline(&["1", "Introduction", "3"], 1, 10.0),
            block("Introduction", 3, 14.0),
        ];
        let outcome = HeadingListStrategy::new(20).extract(&blocks, &PageNumberSequence::default());
        assert_eq!(outcome.retyped, vec![2]);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].text, "1 Introduction");
    }
}
