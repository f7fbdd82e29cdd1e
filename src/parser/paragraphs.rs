//! Paragraph reconstruction.
//!
//! Spans are folded into blocks in one forward pass. Each span is checked
//! against a fixed list of predicates that yield a [`Transition`]; the
//! accumulator then applies it. A second pass stitches paragraphs that a
//! footnote anchor split in two.

use std::collections::{HashMap, HashSet};

use crate::model::{Block, BlockType, ExtractedDocument, Footnote, PageNumberSequence, SizeTagTable, Span};

use super::options::Thresholds;
use super::text::{clean, has_digit, has_dot_leader, is_split_word, starts_with_section_number};

/// Ordinal suffixes typeset smaller than the number they follow.
const ORDINAL_SUFFIXES: [&str; 4] = ["st", "nd", "rd", "th"];

/// Characters that attach to the preceding text without a space.
const ATTACHING_PUNCTUATION: &[char] = &[',', '.', '!', '?', ':', ';', '-'];

/// Minimum movement of both edges for a gap to count as a new paragraph.
const EDGE_SHIFT: f32 = 2.0;

/// Ratio between the previous line's width and this line's width below which
/// a font change starts a paragraph.
const SHORT_LINE_RATIO: f32 = 0.7;

/// What to do with the current span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Close the current block; the next span opens a new one.
    FlushAndStart,
    /// Append to the current block.
    Continue,
    /// Append to the current footnote text block.
    ContinueFootnoteText,
    /// Glue an ordinal suffix onto the current block.
    AppendSuffix,
    /// Close the current block and open one of this type.
    NewBlock(BlockType),
}

/// Number of spans and horizontal extent of one source line.
#[derive(Debug, Clone, Copy, Default)]
struct LineInfo {
    spans: usize,
    width: f32,
}

fn line_infos(spans: &[Span]) -> HashMap<(usize, usize, usize), LineInfo> {
    let mut extents: HashMap<(usize, usize, usize), (usize, f32, f32)> = HashMap::new();
    for s in spans {
        let entry = extents
            .entry(s.line_key())
            .or_insert((0, f32::INFINITY, f32::NEG_INFINITY));
        entry.0 += 1;
        entry.1 = entry.1.min(s.bbox.x0);
        entry.2 = entry.2.max(s.bbox.x1);
    }
    extents
        .into_iter()
        .map(|(key, (spans, x0, x1))| (key, LineInfo { spans, width: x1 - x0 }))
        .collect()
}

/// The previous non-empty span and its effective size.
#[derive(Debug, Clone, Copy)]
struct Previous<'s> {
    span: &'s Span,
    size: f32,
}

/// Observations about the current span relative to the accumulator.
#[derive(Debug, Clone, Copy, Default)]
struct Signals {
    page_number: bool,
    line_change: bool,
    same_size: bool,
    no_space: bool,
    new_paragraph: bool,
    end_of_header: bool,
    suffix: bool,
}

/// Forward-fold state.
struct Accumulator<'s> {
    prev: Option<&'s Span>,
    ps: Option<Previous<'s>>,
    current_line: Option<(usize, usize, usize)>,
    prev_line_width: f32,
    block: Option<Block>,
    blocks: Vec<Block>,
    toc_text: String,
    toc_pages: HashSet<usize>,
    potential_header: String,
    pending: Option<&'s Footnote>,
}

impl<'s> Accumulator<'s> {
    fn new() -> Self {
        Self {
            prev: None,
            ps: None,
            current_line: None,
            prev_line_width: 0.0,
            block: None,
            blocks: Vec::new(),
            toc_text: String::new(),
            toc_pages: HashSet::new(),
            potential_header: String::new(),
            pending: None,
        }
    }

    fn flush(&mut self) {
        if let Some(block) = self.block.take() {
            if !block.is_empty() {
                self.blocks.push(block);
            }
        }
    }
}

/// Builds blocks from spans.
pub struct Reconstructor<'a> {
    tags: &'a SizeTagTable,
    page_numbers: &'a PageNumberSequence,
    footnotes: &'a [Footnote],
    thresholds: &'a Thresholds,
}

impl<'a> Reconstructor<'a> {
    pub fn new(
        tags: &'a SizeTagTable,
        page_numbers: &'a PageNumberSequence,
        footnotes: &'a [Footnote],
        thresholds: &'a Thresholds,
    ) -> Self {
        Self {
            tags,
            page_numbers,
            footnotes,
            thresholds,
        }
    }

    /// Reconstruct blocks, then stitch footnote-split paragraphs.
    pub fn reconstruct(&self, doc: &ExtractedDocument) -> Vec<Block> {
        let blocks = self.fold(&doc.spans);
        let stitched = stitch_footnote_breaks(blocks);
        log::debug!("{}: {} blocks", doc.name, stitched.len());
        stitched
    }

    /// Forward pass producing blocks in reading order.
    pub fn fold(&self, spans: &[Span]) -> Vec<Block> {
        let lines = line_infos(spans);
        let mut acc = Accumulator::new();

        for s in spans {
            if acc.prev.is_some_and(|p| p.page_id != s.page_id) {
                acc.flush();
                acc.pending = None;
                acc.potential_header.clear();
            }

            let key = s.line_key();
            if acc.current_line != Some(key) {
                if let Some(info) = acc.current_line.and_then(|k| lines.get(&k)) {
                    acc.prev_line_width = info.width;
                }
                acc.current_line = Some(key);
            }
            let line = lines.get(&key).copied().unwrap_or_default();

            let is_page_number = self.page_numbers.matches(s.page_id, &s.bbox);
            self.collect_toc_text(&mut acc, s, is_page_number);

            let text = clean(&s.text);
            if text.is_empty() {
                if line.spans == 1 {
                    self.apply(&mut acc, s, &text, Transition::FlushAndStart, false);
                } else {
                    acc.prev = Some(s);
                }
                continue;
            }

            if let Some(f) = self
                .footnotes
                .iter()
                .find(|f| f.page_id == s.page_id && f.text == text && f.bbox == s.bbox)
            {
                acc.pending = Some(f);
            }

            let signals = self.signals(&mut acc, s, &text, line, is_page_number);
            let transition = self.transition(&acc, s, &text, &signals);
            self.apply(&mut acc, s, &text, transition, signals.no_space);
        }
        acc.flush();
        acc.blocks
    }

    /// Collect provisional TOC text for header-boundary detection.
    fn collect_toc_text(&self, acc: &mut Accumulator<'_>, s: &Span, is_page_number: bool) {
        if s.page_id >= self.thresholds.toc_page_limit || is_page_number {
            return;
        }
        if has_dot_leader(&s.text) || acc.toc_pages.contains(&s.page_id) {
            acc.toc_text.push_str(&s.text.to_lowercase());
            acc.toc_pages.insert(s.page_id);
        }
    }

    fn signals(
        &self,
        acc: &mut Accumulator<'_>,
        s: &Span,
        text: &str,
        line: LineInfo,
        is_page_number: bool,
    ) -> Signals {
        let mut sig = Signals {
            page_number: is_page_number,
            ..Default::default()
        };

        if let Some(ps) = acc.ps {
            sig.line_change = ps.span.line_key() != s.line_key();
            sig.same_size = s.size == ps.size;
            sig.new_paragraph = sig.line_change && self.starts_paragraph(s, ps, line, acc.prev_line_width);
            sig.suffix = ORDINAL_SUFFIXES.contains(&text) && ps.size > s.size;
        }

        if let Some(prev) = acc.prev {
            sig.no_space = !sig.line_change
                && !prev.text.ends_with(' ')
                && !s.text.starts_with(' ')
                && self.touches(prev, s);
        }

        sig.end_of_header = self.track_header(acc, &s.text, text);
        sig
    }

    /// Whether `s` starts where `prev` ends, leaving no visible word gap.
    fn touches(&self, prev: &Span, s: &Span) -> bool {
        s.bbox.x0 - prev.bbox.x1 < prev.size * self.thresholds.word_gap_factor
    }

    /// New-paragraph test, evaluated only on a line or block change.
    fn starts_paragraph(&self, s: &Span, ps: Previous<'_>, line: LineInfo, prev_line_width: f32) -> bool {
        let gap = (s.bbox.y0 - ps.span.bbox.y1).abs() > ps.size * self.thresholds.paragraph_gap_factor
            && (s.bbox.y0 - ps.span.bbox.y0).abs() > EDGE_SHIFT
            && (s.bbox.y1 - ps.span.bbox.y1).abs() > EDGE_SHIFT;
        if gap {
            return true;
        }
        let font_changed = s.font != ps.span.font;
        (font_changed && line.width * SHORT_LINE_RATIO > prev_line_width)
            || starts_with_section_number(&s.text)
    }

    /// Grow a potential header while it still reads as TOC text. Returns true
    /// when a long enough header has just ended.
    fn track_header(&self, acc: &mut Accumulator<'_>, raw: &str, text: &str) -> bool {
        let lower = raw.to_lowercase();
        let toc = &acc.toc_text;

        if acc.potential_header.is_empty() {
            if has_digit(text) && toc.contains(lower.as_str()) {
                acc.potential_header = lower;
            }
            return false;
        }

        let grown = format!("{}{}", acc.potential_header, lower);
        if toc.contains(grown.trim()) {
            acc.potential_header = grown;
            return false;
        }

        let ended = acc.potential_header.chars().count() > self.thresholds.header_match_len
            && toc.contains(acc.potential_header.as_str());
        acc.potential_header.clear();
        ended
    }

    fn transition(&self, acc: &Accumulator<'_>, s: &Span, text: &str, sig: &Signals) -> Transition {
        let block = acc.block.as_ref().filter(|b| !b.is_empty() && b.page_id == s.page_id);

        let continuation = (sig.same_size || sig.no_space || !sig.line_change)
            && !sig.new_paragraph
            && !sig.end_of_header
            && !sig.page_number
            && acc.pending.is_none()
            && block.is_some_and(|b| b.block_type.is_continuable());
        if continuation {
            return Transition::Continue;
        }

        if block.is_some_and(|b| b.block_type == BlockType::FootnoteText)
            && acc.pending.is_none()
            && !sig.page_number
        {
            return Transition::ContinueFootnoteText;
        }

        if sig.suffix && block.is_some() {
            return Transition::AppendSuffix;
        }

        let block_type = if sig.page_number {
            BlockType::PageNumber
        } else if let Some(f) = acc.pending {
            if !f.is_page_bottom {
                BlockType::FootnoteId
            } else if f.text == text {
                BlockType::FootnoteTextId
            } else {
                BlockType::FootnoteText
            }
        } else if self.tags.tag_for(s.size, &s.font).is_header() {
            BlockType::Header
        } else {
            BlockType::Text
        };
        Transition::NewBlock(block_type)
    }

    fn apply<'s>(
        &self,
        acc: &mut Accumulator<'s>,
        s: &'s Span,
        text: &str,
        transition: Transition,
        no_space: bool,
    ) {
        let tag = self.tags.tag_for(s.size, &s.font);
        let mut size = s.size;

        match transition {
            Transition::FlushAndStart => {
                acc.flush();
                return;
            }
            Transition::Continue | Transition::ContinueFootnoteText => {
                if let (Some(block), Some(ps)) = (acc.block.as_mut(), acc.ps) {
                    append(block, ps.span, s, text, no_space);
                    block.bbox = block.bbox.union(&s.bbox);
                    block.merged_tags.push(tag);
                }
            }
            Transition::AppendSuffix => {
                if let Some(block) = acc.block.as_mut() {
                    block.text.push_str(text);
                    block.merged_tags.push(tag);
                    block.bbox = block.bbox.union(&s.bbox);
                }
                size = acc.ps.map_or(size, |ps| ps.size);
            }
            Transition::NewBlock(block_type) => {
                acc.flush();
                let mut block = Block::new(text, block_type, tag, s.size, s.page_id, s.bbox);
                block.color = s.color;
                block.block_id = s.block_id;
                block.line_id = s.line_id;
                match block_type {
                    BlockType::FootnoteId => {
                        block.footnote_id_pos = Some(acc.blocks.last().map_or(0, Block::char_len));
                        acc.pending = None;
                    }
                    BlockType::FootnoteText => acc.pending = None,
                    _ => {}
                }
                acc.block = Some(block);
            }
        }

        acc.ps = Some(Previous { span: s, size });
        acc.prev = Some(s);
    }
}

/// Append a span's text, repairing words hyphenated across lines.
fn append(block: &mut Block, ps: &Span, s: &Span, text: &str, no_space: bool) {
    let earlier_line = (ps.block_id, ps.line_id) < (s.block_id, s.line_id);
    let line_change = ps.line_key() != s.line_key();

    if earlier_line && is_split_word(&ps.text, text) && block.text.ends_with('-') {
        block.text.pop();
        block.line_breaks.push(block.text.len());
        block.text.push_str(text);
        return;
    }

    if line_change {
        block.line_breaks.push(block.text.len());
    }
    if !no_space {
        block.text.push(' ');
    }
    block.text.push_str(text);
}

/// Merge paragraphs that a footnote anchor split in two.
///
/// A body block directly after one or more anchors joins the nearest earlier
/// non-anchor block with the same tag on the same page. The anchors record
/// the join offset and stay in the list.
pub fn stitch_footnote_breaks(blocks: Vec<Block>) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());

    for block in blocks {
        let anchors = out
            .iter()
            .rev()
            .take_while(|b| b.block_type == BlockType::FootnoteId)
            .count();

        if anchors > 0 && block.block_type.is_body() && out.len() > anchors {
            let target_idx = out.len() - anchors - 1;
            let target = &out[target_idx];
            if target.tag == block.tag && target.page_id == block.page_id && target.block_type.is_body() {
                let pos = target.char_len();
                for anchor in &mut out[target_idx + 1..] {
                    anchor.footnote_id_pos = Some(pos);
                }
                join(&mut out[target_idx], block);
                continue;
            }
        }
        out.push(block);
    }
    out
}

fn join(target: &mut Block, block: Block) {
    let attaches = block.text.starts_with(ATTACHING_PUNCTUATION);
    if !attaches {
        target.text.push(' ');
    }
    let offset = target.text.len();
    target.text.push_str(&block.text);
    target
        .line_breaks
        .extend(block.line_breaks.iter().map(|b| b + offset));
    target.bbox = target.bbox.union(&block.bbox);
    target.merged_tags.extend(block.merged_tags);
}
