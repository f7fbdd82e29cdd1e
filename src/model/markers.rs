//! Page numbers and footnotes detected in the span stream.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Numbering system of a printed page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumeralType {
    Arabic,
    Roman,
}

/// A printed page number found on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageNumber {
    /// Text as printed (stripped)
    pub text: String,
    /// Numeric value
    pub value: u32,
    pub bbox: BBox,
    pub page_id: usize,
    pub numeral_type: NumeralType,
    /// Whether the page is portrait
    pub vertical: bool,
}

/// An accepted run of consecutive page numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageNumberSequence {
    /// One entry per page, in page order
    pub numbers: Vec<PageNumber>,
    /// Envelope of the first number and every portrait-page number
    pub max_bbox: Option<BBox>,
}

impl PageNumberSequence {
    /// Build a sequence and compute its envelope.
    pub fn new(numbers: Vec<PageNumber>) -> Self {
        let max_bbox = numbers.first().map(|first| {
            numbers
                .iter()
                .filter(|n| n.vertical)
                .fold(first.bbox, |acc, n| acc.union(&n.bbox))
        });
        Self { numbers, max_bbox }
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Whether a span at `bbox` on `page_id` is the detected page number.
    pub fn matches(&self, page_id: usize, bbox: &BBox) -> bool {
        self.on_page(page_id).is_some_and(|n| n.bbox == *bbox)
    }

    /// Page number printed on a page.
    pub fn on_page(&self, page_id: usize) -> Option<&PageNumber> {
        self.numbers.iter().find(|n| n.page_id == page_id)
    }

    /// Page index whose printed arabic value equals `value`.
    pub fn page_for_value(&self, value: u32) -> Option<usize> {
        self.numbers
            .iter()
            .find(|n| n.numeral_type == NumeralType::Arabic && n.value == value)
            .map(|n| n.page_id)
    }
}

/// A footnote marker: either an in-body anchor or a page-bottom definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    /// Marker digits
    pub text: String,
    pub page_id: usize,
    pub bbox: BBox,
    pub size: f32,
    pub font: String,
    /// Definition at the bottom of the page rather than an anchor in the body
    pub is_page_bottom: bool,
}

impl Footnote {
    /// Numeric value of the marker.
    pub fn value(&self) -> Option<u32> {
        self.text.parse().ok()
    }
}
