//! PDF parsing module.
//!
//! Stages run in a fixed order, each reading the previous stage's output:
//! span extraction, font classification, page numbers, footnotes, block
//! reconstruction, TOC extraction and TOC matching.

pub mod backend;
mod extractor;
mod fonts;
mod footnotes;
mod matcher;
mod options;
mod page_numbers;
mod paragraphs;
mod pdf_parser;
pub mod text;
mod toc;

pub use backend::{LopdfBackend, PdfBackend};
pub use extractor::SpanExtractor;
pub use fonts::FontClassifier;
pub use footnotes::FootnoteDetector;
pub use matcher::{match_toc, token_sort_ratio};
pub use options::{ErrorMode, ParseOptions, StyleMatch, Thresholds};
pub use page_numbers::{Candidate, PageNumberSequencer};
pub use paragraphs::{stitch_footnote_breaks, Reconstructor, Transition};
pub use pdf_parser::{parse_spans, DocumentParser};
pub use toc::{
    block_lines, DotLeaderParser, DotLeaderStrategy, HeadingListStrategy, TocExtractor, TocOutcome,
    TocStrategy,
};
