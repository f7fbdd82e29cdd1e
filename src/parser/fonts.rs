//! Font size classification.
//!
//! The most frequent font key is body text; every other key becomes a
//! header level (larger) or a subscript level (smaller).

use crate::error::{Error, Result};
use crate::model::{FontKey, SizeTag, SizeTagEntry, SizeTagTable, Span};

/// Builds a [`SizeTagTable`] from a document's spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontClassifier {
    granularity: bool,
}

impl FontClassifier {
    /// Key on size alone, or on (size, font) when `granularity` is set.
    pub fn new(granularity: bool) -> Self {
        Self { granularity }
    }

    /// Count spans per key, in first-seen order. Blank spans do not vote.
    pub fn histogram(&self, spans: &[Span]) -> Vec<(FontKey, usize)> {
        let mut buckets: Vec<(FontKey, usize)> = Vec::new();
        for span in spans.iter().filter(|s| !s.is_blank()) {
            let key = if self.granularity {
                FontKey::with_font(span.size, span.font.as_str())
            } else {
                FontKey::size(span.size)
            };
            match buckets.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => buckets.push((key, 1)),
            }
        }
        buckets
    }

    /// Assign a tag to every key.
    pub fn classify(&self, spans: &[Span]) -> Result<SizeTagTable> {
        let histogram = self.histogram(spans);

        let mut body_idx = None;
        for (i, (_, count)) in histogram.iter().enumerate() {
            if body_idx.map_or(true, |b: usize| *count > histogram[b].1) {
                body_idx = Some(i);
            }
        }
        let body_idx = body_idx.ok_or(Error::NoFontsFound)?;
        let body = histogram[body_idx].0.clone();

        let mut larger: Vec<usize> = Vec::new();
        let mut same_size: Vec<usize> = Vec::new();
        let mut smaller: Vec<usize> = Vec::new();
        for (i, (key, _)) in histogram.iter().enumerate() {
            if i == body_idx {
                continue;
            }
            if key.size > body.size {
                larger.push(i);
            } else if key.size < body.size {
                smaller.push(i);
            } else {
                same_size.push(i);
            }
        }
        let by_size_desc = |a: &usize, b: &usize| histogram[*b].0.size.total_cmp(&histogram[*a].0.size);
        larger.sort_by(by_size_desc);
        smaller.sort_by(by_size_desc);

        let mut tags = vec![SizeTag::Paragraph; histogram.len()];
        for (level, &i) in larger.iter().chain(same_size.iter()).enumerate() {
            tags[i] = SizeTag::Header(level as u16 + 1);
        }
        for (level, &i) in smaller.iter().enumerate() {
            tags[i] = SizeTag::Subscript(level as u16 + 1);
        }

        let entries: Vec<SizeTagEntry> = histogram
            .into_iter()
            .zip(tags)
            .map(|((key, count), tag)| SizeTagEntry { key, count, tag })
            .collect();

        log::debug!(
            "font classes: {} keys, body size {}",
            entries.len(),
            body.size
        );

        Ok(SizeTagTable {
            entries,
            body,
            granularity: self.granularity,
        })
    }
}
