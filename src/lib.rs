//! # pdfstruct
//!
//! Structural parsing of report-style PDF documents.
//!
//! A document is read as positioned text spans and rebuilt into logical
//! blocks (paragraphs, headers, page numbers, footnotes). The document's own
//! table of contents is extracted and each entry is linked to the body block
//! it names.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfstruct::{parse_file, render};
//!
//! fn main() -> pdfstruct::Result<()> {
//!     let doc = parse_file("evaluation.pdf")?;
//!
//!     for entry in &doc.toc {
//!         println!("{} ... {}", entry.text, entry.page_number);
//!     }
//!
//!     render::write_outputs(&doc, "parsed")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. Span extraction (lopdf content streams)
//! 2. Font size classification into `<h1>`, `<p>`, `<s1>` tags
//! 3. Printed page-number sequence detection
//! 4. Footnote anchor and definition detection
//! 5. Block reconstruction with footnote stitching
//! 6. TOC extraction, dot leaders first and heading lists second
//! 7. Fuzzy TOC-to-block matching

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

pub use batch::{BatchOptions, BatchProcessor, BatchSummary, FileReport, FileStatus};
pub use detect::{is_pdf_bytes, pdf_version, pdf_version_from_path};
pub use error::{Error, Result, Stage};
pub use model::{
    BBox, Block, BlockType, DocumentStats, ExtractedDocument, Footnote, NumeralType, PageNumber,
    PageNumberSequence, ParsedDocument, SectionType, SizeTag, SizeTagTable, Span, TocEntry, TocMatch,
};
pub use parser::{parse_spans, DocumentParser, ErrorMode, ParseOptions, StyleMatch, Thresholds};

use std::io::Read;
use std::path::Path;

/// Parse a PDF file.
///
/// # Example
///
/// ```no_run
/// let doc = pdfstruct::parse_file("report.pdf").unwrap();
/// println!("{} blocks, {} toc entries", doc.blocks.len(), doc.toc.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedDocument> {
    DocumentParser::open(path)?.parse()
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .with_granularity(true)
///     .with_font_size_remainder(1);
/// let doc = parse_file_with_options("report.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<ParsedDocument> {
    DocumentParser::open_with_options(path, options)?.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<ParsedDocument> {
    DocumentParser::from_bytes(data)?.parse()
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<ParsedDocument> {
    DocumentParser::from_bytes_with_options(data, options)?.parse()
}

/// Parse a PDF from a reader.
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
///
/// let file = File::open("report.pdf").unwrap();
/// let doc = pdfstruct::parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<ParsedDocument> {
    DocumentParser::from_reader(reader)?.parse()
}

/// Parse a PDF from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<ParsedDocument> {
    DocumentParser::from_reader_with_options(reader, options)?.parse()
}

/// Extract the body text of a PDF file, paragraphs separated by blank lines.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.plain_text())
}

/// Extract only the table of contents of a PDF file.
pub fn extract_toc<P: AsRef<Path>>(path: P) -> Result<Vec<TocEntry>> {
    Ok(parse_file(path)?.toc)
}
