//! Page-number sequence detection.
//!
//! A page number is a short arabic or roman span whose value grows by
//! exactly one per page at roughly the same vertical position.

use std::collections::HashMap;

use crate::model::{BBox, ExtractedDocument, NumeralType, PageNumber, PageNumberSequence};

use super::options::{ParseOptions, StyleMatch};
use super::text::{parse_arabic, parse_roman};

/// A span that could be a printed page number.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub value: u32,
    pub numeral_type: NumeralType,
    pub bbox: BBox,
    pub page_id: usize,
    pub font: String,
    pub size: f32,
    pub vertical: bool,
}

impl Candidate {
    fn into_page_number(self) -> PageNumber {
        PageNumber {
            text: self.text,
            value: self.value,
            bbox: self.bbox,
            page_id: self.page_id,
            numeral_type: self.numeral_type,
            vertical: self.vertical,
        }
    }

    fn deviation(&self, other: &Candidate) -> f32 {
        (self.bbox.y0 - other.bbox.y0).abs() + (self.bbox.y1 - other.bbox.y1).abs()
    }
}

/// Finds the longest run of consecutive page numbers.
pub struct PageNumberSequencer<'a> {
    options: &'a ParseOptions,
}

impl<'a> PageNumberSequencer<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    /// Collect candidates in page order.
    pub fn candidates(&self, doc: &ExtractedDocument) -> Vec<Candidate> {
        let t = &self.options.thresholds;
        let arabic_limit = doc.page_count() as u32 + t.page_number_slack;

        let mut candidates: Vec<Candidate> = doc
            .spans
            .iter()
            .filter_map(|span| {
                let text = span.text.trim();
                if text.chars().count() >= t.page_number_max_len || text.contains('+') {
                    return None;
                }
                let (value, numeral_type) = match parse_arabic(text) {
                    Some(v) if v < arabic_limit => (v, NumeralType::Arabic),
                    Some(_) => return None,
                    None => (parse_roman(text)?, NumeralType::Roman),
                };
                Some(Candidate {
                    text: text.to_string(),
                    value,
                    numeral_type,
                    bbox: span.bbox,
                    page_id: span.page_id,
                    font: span.font.clone(),
                    size: span.size,
                    vertical: doc.is_vertical(span.page_id),
                })
            })
            .collect();

        candidates.sort_by_key(|c| c.page_id);
        candidates
    }

    /// Detect the page-number sequence. An empty sequence means none was found.
    pub fn detect(&self, doc: &ExtractedDocument) -> PageNumberSequence {
        let candidates = self.candidates(doc);
        let sequence = self.longest_run(&candidates);
        log::debug!(
            "{}: {} page-number candidates, sequence of {}",
            doc.name,
            candidates.len(),
            sequence.len()
        );
        sequence
    }

    /// Keep the longest run (earliest on ties) if it is long enough.
    pub fn longest_run(&self, candidates: &[Candidate]) -> PageNumberSequence {
        let mut by_page: HashMap<usize, Vec<&Candidate>> = HashMap::new();
        for c in candidates {
            by_page.entry(c.page_id).or_default().push(c);
        }

        let mut best: Vec<&Candidate> = Vec::new();
        for anchor in candidates {
            let run = self.run_from(anchor, &by_page);
            if run.len() > best.len() {
                best = run;
            }
        }

        if best.len() < self.options.thresholds.min_sequence_length {
            return PageNumberSequence::default();
        }
        PageNumberSequence::new(best.into_iter().cloned().map(Candidate::into_page_number).collect())
    }

    /// Follow an anchor forward page by page until a page has no continuation.
    fn run_from<'c>(
        &self,
        anchor: &'c Candidate,
        by_page: &HashMap<usize, Vec<&'c Candidate>>,
    ) -> Vec<&'c Candidate> {
        let budget = self.options.thresholds.page_number_error_budget;
        let style = self.options.page_number_style_match;

        let mut run = vec![anchor];
        for offset in 1.. {
            let page = anchor.page_id + offset;
            let expected = anchor.value + offset as u32;

            let mut chosen: Option<(&Candidate, f32)> = None;
            for &c in by_page.get(&page).into_iter().flatten() {
                if c.value != expected || c.numeral_type != anchor.numeral_type {
                    continue;
                }
                let error = c.deviation(anchor);
                if c.vertical == anchor.vertical && error > budget {
                    continue;
                }
                if !style_matches(style, anchor, c) {
                    continue;
                }
                if chosen.map_or(true, |(_, best)| error < best) {
                    chosen = Some((c, error));
                }
            }

            match chosen {
                Some((c, _)) => run.push(c),
                None => break,
            }
        }
        run
    }
}

fn style_matches(style: StyleMatch, a: &Candidate, b: &Candidate) -> bool {
    style.matches(&a.font, a.size, &b.font, b.size)
}
