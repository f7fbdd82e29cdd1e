//! Footnote detection.
//!
//! A footnote shows up twice on a page: a small digit in the body (the
//! anchor) and the same digit at the bottom of the page (the definition).

use std::collections::HashMap;

use crate::model::{ExtractedDocument, Footnote, SizeTagTable, Span};

use super::text::is_digits;

/// A digit span with the sizes of its neighbours.
#[derive(Debug, Clone)]
struct Candidate<'s> {
    span: &'s Span,
    text: &'s str,
    prev_size: Option<f32>,
    next_size: Option<f32>,
}

impl Candidate<'_> {
    /// Superscripts are smaller than at least one neighbour. The last span on
    /// a page has nothing to compare with and passes.
    fn is_raised(&self) -> bool {
        let size = self.span.size;
        self.next_size.is_none()
            || self.prev_size.is_some_and(|p| p > size)
            || self.next_size.is_some_and(|n| n > size)
    }
}

/// Identifies footnote anchors and definitions.
pub struct FootnoteDetector<'a> {
    tags: &'a SizeTagTable,
}

impl<'a> FootnoteDetector<'a> {
    pub fn new(tags: &'a SizeTagTable) -> Self {
        Self { tags }
    }

    /// Detect footnotes in document order.
    pub fn detect(&self, doc: &ExtractedDocument) -> Vec<Footnote> {
        let mut accepted: Vec<Footnote> = Vec::new();
        let mut doc_counts: HashMap<String, usize> = HashMap::new();

        let spans = &doc.spans;
        let mut start = 0;
        while start < spans.len() {
            let page_id = spans[start].page_id;
            let end = spans[start..]
                .iter()
                .position(|s| s.page_id != page_id)
                .map_or(spans.len(), |n| start + n);

            let candidates = self.page_candidates(spans, start, end);
            self.accept_page(candidates, &mut accepted, &mut doc_counts);
            start = end;
        }

        log::debug!("{}: {} footnote markers", doc.name, accepted.len());
        accepted
    }

    /// Valid digit spans of `spans[start..end]`, all on one page.
    fn page_candidates<'s>(&self, spans: &'s [Span], start: usize, end: usize) -> Vec<Candidate<'s>> {
        (start..end)
            .filter_map(|i| {
                let span = &spans[i];
                let text = span.text.trim();
                if !is_digits(text) {
                    return None;
                }
                let candidate = Candidate {
                    span,
                    text,
                    prev_size: i.checked_sub(1).map(|p| spans[p].size),
                    next_size: (i + 1 < end).then(|| spans[i + 1].size),
                };
                let tag = self.tags.tag_for(span.size, &span.font);
                if tag.is_header() || tag.is_paragraph() || !candidate.is_raised() {
                    return None;
                }
                Some(candidate)
            })
            .collect()
    }

    fn accept_page(
        &self,
        candidates: Vec<Candidate<'_>>,
        accepted: &mut Vec<Footnote>,
        doc_counts: &mut HashMap<String, usize>,
    ) {
        let mut page_counts: HashMap<&str, usize> = HashMap::new();
        for c in &candidates {
            *page_counts.entry(c.text).or_default() += 1;
        }

        let mut accepted_on_page: Vec<&str> = Vec::new();
        for c in &candidates {
            if page_counts.get(c.text) != Some(&2) {
                continue;
            }

            let is_page_bottom = match accepted.last() {
                None => false,
                Some(last) if follows(c.text, &last.text) && !accepted_on_page.contains(&c.text) => {
                    false
                }
                Some(_) if doc_counts.get(c.text).copied().unwrap_or(10) < 2 => true,
                Some(_) => continue,
            };

            accepted.push(Footnote {
                text: c.text.to_string(),
                page_id: c.span.page_id,
                bbox: c.span.bbox,
                size: c.span.size,
                font: c.span.font.clone(),
                is_page_bottom,
            });
            *doc_counts.entry(c.text.to_string()).or_default() += 1;
            accepted_on_page.push(c.text);
        }
    }
}

/// Whether marker `next` is exactly one more than `last`. Numbers too large
/// to parse never follow anything.
fn follows(next: &str, last: &str) -> bool {
    match (next.parse::<u64>(), last.parse::<u64>()) {
        (Ok(next), Ok(last)) => last.checked_add(1) == Some(next),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, PageGeometry};
    use crate::parser::fonts::FontClassifier;

    fn span(text: &str, size: f32, page: usize, y: f32) -> Span {
        Span::new(text, BBox::new(72.0, y, 400.0, y + size), "Times", size).on_page(page)
    }

    fn page_with_footnote(page: usize, digit: &str) -> Vec<Span> {
        vec![
            span("Body text before the anchor", 12.0, page, 100.0),
            span(digit, 8.0, page, 98.0),
            span("and after it.", 12.0, page, 100.0),
            span("More body text on the page", 12.0, page, 120.0),
            span(digit, 8.0, page, 700.0),
            span("Footnote definition text", 8.0, page, 700.0),
        ]
    }

    fn detect(spans: Vec<Span>, pages: usize) -> Vec<Footnote> {
        let doc = ExtractedDocument {
            name: "test".to_string(),
            spans,
            pages: vec![PageGeometry::default(); pages],
        };
        let tags = FontClassifier::new(false).classify(&doc.spans).unwrap();
        FootnoteDetector::new(&tags).detect(&doc)
    }

    #[test]
    fn test_anchor_and_definition() {
        let footnotes = detect(page_with_footnote(0, "1"), 1);
        assert_eq!(footnotes.len(), 2);
        assert!(!footnotes[0].is_page_bottom);
        assert!(footnotes[1].is_page_bottom);
        assert_eq!(footnotes[1].bbox.y0, 700.0);
    }

    #[test]
    fn test_consecutive_footnotes_across_pages() {
        let mut spans = page_with_footnote(0, "1");
        spans.extend(page_with_footnote(1, "2"));
        let footnotes = detect(spans, 2);

        let summary: Vec<_> = footnotes
            .iter()
            .map(|f| (f.text.as_str(), f.page_id, f.is_page_bottom))
            .collect();
        assert_eq!(
            summary,
            vec![("1", 0, false), ("1", 0, true), ("2", 1, false), ("2", 1, true)]
        );
    }

    #[test]
    fn test_body_size_digits_are_ignored() {
        let spans = vec![
            span("In", 12.0, 0, 100.0),
            span("2019", 12.0, 0, 100.0),
            span("and", 12.0, 0, 100.0),
            span("2019", 12.0, 0, 100.0),
        ];
        assert!(detect(spans, 1).is_empty());
    }

    #[test]
    fn test_single_occurrence_is_not_a_footnote() {
        let mut spans = page_with_footnote(0, "1");
        spans.truncate(4);
        assert!(detect(spans, 1).is_empty());
    }

    #[test]
    fn test_follows() {
        assert!(follows("2", "1"));
        assert!(follows("10", "9"));
        assert!(!follows("1", "1"));
        assert!(!follows("3", "1"));
        assert!(!follows("1", "18446744073709551615"));
        assert!(!follows("100000000000000000000000", "99999999999999999999999"));
    }

    #[test]
    fn test_oversized_markers_are_not_consecutive() {
        let mut spans = page_with_footnote(0, "1234567890123456789012345");
        spans.extend(page_with_footnote(1, "9876543210987654321098765"));
        let footnotes = detect(spans, 2);

        assert_eq!(footnotes.len(), 2);
        assert!(footnotes.iter().all(|f| f.page_id == 0));
    }
}
