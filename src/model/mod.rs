//! Document model types.
//!
//! Spans come out of the extractor; every later stage reads them and
//! produces its own owned output, ending in a [`ParsedDocument`].

mod block;
mod document;
mod font;
mod markers;
mod span;
mod toc;

pub use block::{Block, BlockType};
pub use document::{DocumentStats, ParsedDocument};
pub use font::{FontKey, ParseSizeTagError, SizeTag, SizeTagEntry, SizeTagTable};
pub use markers::{Footnote, NumeralType, PageNumber, PageNumberSequence};
pub use span::{BBox, ExtractedDocument, PageGeometry, Span};
pub use toc::{SectionType, TocEntry, TocMatch};
