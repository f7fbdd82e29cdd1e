//! Tables of contents laid out as `Heading ........ 12`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Block, BlockType, NumeralType, PageNumberSequence, SectionType, TocEntry};
use crate::parser::text::{has_dot_leader, normalize_whitespace, parse_arabic, parse_roman};

use super::{arabic_section, block_lines, is_annex, roman_section, TocOutcome, TocStrategy};

static DOT_ARABIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}\s*([0-9]+)").expect("valid dot leader regex"));

static DOT_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}\s*([MDCLXVI]+)\b").expect("valid dot leader regex"));

static TRAILING_ARABIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)$").expect("valid trailing number regex"));

static TRAILING_ROMAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([MDCLXVI]+)$").expect("valid trailing numeral regex"));

/// Buffer ending in a lone letter, e.g. `"P"` of a heading split as `"P urpose"`.
static LONE_LETTER_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s[a-zA-Z]$").expect("valid tail regex"));

/// A lone roman letter after a word is a numeral, not a split word.
static ROMAN_LETTER_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.A-Z]\s[MDCLXVI]$").expect("valid tail regex"));

/// Pages, blocks and font sizes that make up the TOC region.
#[derive(Debug, Default)]
struct Region {
    pages: Vec<usize>,
    block_ids: HashSet<usize>,
    sizes: Vec<f32>,
}

/// Finds TOC pages by their dot leaders and parses every line on them.
#[derive(Debug, Clone, Copy)]
pub struct DotLeaderStrategy {
    page_limit: usize,
}

impl DotLeaderStrategy {
    pub fn new(page_limit: usize) -> Self {
        Self { page_limit }
    }

    /// Flag pages with dot leaders. A page joins only while the run of
    /// flagged pages stays contiguous.
    fn locate(&self, blocks: &[Block]) -> Region {
        let mut region = Region::default();

        for (idx, b) in blocks.iter().enumerate() {
            if b.page_id > self.page_limit {
                break;
            }
            let dotted = block_lines(b).iter().any(|line| has_dot_leader(line));
            if !dotted && !region.pages.contains(&b.page_id) {
                continue;
            }
            let last = region.pages.last().copied();
            if last.is_some_and(|l| b.page_id.saturating_sub(l) >= 2) {
                continue;
            }
            if last != Some(b.page_id) {
                region.pages.push(b.page_id);
            }

            if b.block_type == BlockType::Text {
                region.block_ids.insert(idx);
                if !region.sizes.contains(&b.size) {
                    region.sizes.push(b.size);
                }
            }
        }
        region
    }
}

impl TocStrategy for DotLeaderStrategy {
    fn name(&self) -> &'static str {
        "dot leaders"
    }

    fn extract(&self, blocks: &[Block], page_numbers: &PageNumberSequence) -> TocOutcome {
        let region = self.locate(blocks);
        if region.pages.is_empty() {
            return TocOutcome::default();
        }

        let mut buffer = LineBuffer::default();
        let mut retyped = Vec::new();
        for (idx, b) in blocks.iter().enumerate() {
            if b.page_id > self.page_limit {
                break;
            }
            if !region.pages.contains(&b.page_id) || b.block_type == BlockType::PageNumber {
                continue;
            }
            // Stay a font size above the page-number band.
            if let Some(max) = page_numbers.max_bbox {
                if b.bbox.y1 >= max.y1 - b.size {
                    continue;
                }
            }

            retyped.push(idx);
            if region.block_ids.contains(&idx) || region.sizes.contains(&b.size) {
                buffer.push(b);
            }
        }

        let lines: Vec<&str> = buffer.lines.iter().map(String::as_str).collect();
        TocOutcome {
            entries: DotLeaderParser::default().parse(&lines),
            retyped,
        }
    }
}

/// TOC text collected line by line across blocks.
#[derive(Debug, Default)]
struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    fn push(&mut self, block: &Block) {
        let mut incoming = block_lines(block).into_iter().map(|line| {
            line.chars()
                .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
                .collect::<String>()
        });

        if let Some(last) = self.lines.last_mut() {
            let split_word = LONE_LETTER_TAIL.is_match(last)
                && !ROMAN_LETTER_TAIL.is_match(&last.to_ascii_uppercase());
            if split_word {
                if let Some(first) = incoming.next() {
                    last.push_str(&first);
                }
            }
        }
        self.lines.extend(incoming);
    }
}

/// A page number found at the end of a line.
#[derive(Debug, Clone)]
struct Trailing {
    start: usize,
    page: String,
    value: u32,
    numeral_type: NumeralType,
}

/// Line-by-line parser for dot-leader TOC text.
#[derive(Debug, Default)]
pub struct DotLeaderParser {
    entries: Vec<TocEntry>,
    carry: String,
    prev_page: u32,
    prev_type: Option<NumeralType>,
    last_added: Option<usize>,
    section_type: SectionType,
    roman_mode: bool,
    /// Level and section of the last completed line, kept or not
    prev_row: Option<(u32, Option<String>)>,
}

impl DotLeaderParser {
    /// Parse TOC lines into entries.
    pub fn parse(mut self, lines: &[&str]) -> Vec<TocEntry> {
        for (ii, line) in lines.iter().enumerate() {
            self.parse_line(ii, line.trim());
        }
        self.entries
    }

    fn parse_line(&mut self, ii: usize, line: &str) {
        let upper = line.to_ascii_uppercase();

        let dot = DOT_ARABIC
            .captures(line)
            .and_then(|c| {
                let value = parse_arabic(c.get(1)?.as_str())?;
                Some((c.get(0)?.start(), value, NumeralType::Arabic))
            })
            .or_else(|| {
                DOT_ROMAN.captures(&upper).and_then(|c| {
                    let value = parse_roman(c.get(1)?.as_str())?;
                    Some((c.get(0)?.start(), value, NumeralType::Roman))
                })
            });
        let trailing = trailing_page_number(line, &upper);

        let short_after_entry =
            self.last_added.is_some_and(|l| ii == l + 1) && line.chars().count() < 5;
        let is_page_number = trailing.as_ref().is_some_and(|t| {
            t.value >= self.prev_page
                && self.prev_type.map_or(true, |p| p == t.numeral_type)
                && (t.start == 0 || line[..t.start].ends_with(' '))
                && !short_after_entry
        });

        let (mstart, page, value, numeral_type) = match (&trailing, dot) {
            (Some(t), Some((start, _, _))) => (start, t.page.clone(), t.value, t.numeral_type),
            (Some(t), None) if is_page_number => (t.start, t.page.clone(), t.value, t.numeral_type),
            (None, Some((start, value, kind))) => (start, value.to_string(), value, kind),
            _ => {
                self.carry.push(' ');
                self.carry.push_str(line);
                return;
            }
        };

        let carried = self.carry.trim();
        let header = if carried.is_empty() {
            line[..mstart].trim().to_string()
        } else {
            format!("{} {}", carried, line[..mstart].trim())
        };
        self.carry.clear();

        if is_annex(&header) {
            self.section_type = SectionType::Annex;
        }

        let (section, level) = if let Some(roman) = roman_section(&header) {
            self.roman_mode = true;
            (Some(roman.to_string()), 1)
        } else if let Some(arabic) = arabic_section(&header) {
            let dots = arabic.matches('.').count() as u32;
            let section = arabic.trim_end_matches('.').to_string();
            (Some(section), dots + u32::from(self.roman_mode))
        } else {
            (None, 0)
        };

        let parent_section = match &self.prev_row {
            Some((prev_level, prev_section)) if level > *prev_level => prev_section.clone(),
            Some(_) => self
                .entries
                .iter()
                .rev()
                .find(|e| e.section_level == level)
                .and_then(|e| e.parent_section.clone()),
            None => None,
        };

        let text = normalize_whitespace(&header);
        if !text.is_empty() {
            self.entries.push(TocEntry {
                text,
                page_number: page,
                section: section.clone(),
                section_level: level,
                section_type: self.section_type,
                parent_section,
                toc_match: None,
            });
        }

        self.prev_row = Some((level, section));
        self.prev_page = value;
        self.prev_type = Some(numeral_type);
        self.last_added = Some(ii);
    }
}

fn trailing_page_number(line: &str, upper: &str) -> Option<Trailing> {
    if let Some(m) = TRAILING_ARABIC.find(line) {
        let value = parse_arabic(m.as_str())?;
        return Some(Trailing {
            start: m.start(),
            page: m.as_str().to_string(),
            value,
            numeral_type: NumeralType::Arabic,
        });
    }
    let m = TRAILING_ROMAN.captures(upper)?.get(1)?;
    let value = parse_roman(m.as_str())?;
    Some(Trailing {
        start: m.start(),
        page: value.to_string(),
        value,
        numeral_type: NumeralType::Roman,
    })
}
