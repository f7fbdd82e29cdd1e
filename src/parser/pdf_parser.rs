//! Document parser: runs every stage over one PDF.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result, Stage};
use crate::model::{DocumentStats, ExtractedDocument, ParsedDocument, Span};

use super::backend::LopdfBackend;
use super::extractor::SpanExtractor;
use super::fonts::FontClassifier;
use super::footnotes::FootnoteDetector;
use super::matcher::match_toc;
use super::options::ParseOptions;
use super::page_numbers::PageNumberSequencer;
use super::paragraphs::Reconstructor;
use super::toc::TocExtractor;

/// Name used for documents that do not come from a file.
const UNNAMED: &str = "document";

/// PDF structural parser.
pub struct DocumentParser {
    backend: LopdfBackend,
    options: ParseOptions,
    name: String,
}

impl DocumentParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let backend = LopdfBackend::load_file(path).map_err(|e| e.at(Stage::Extract))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNNAMED.to_string());

        Ok(Self {
            backend,
            options,
            name,
        })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data).map_err(|e| e.at(Stage::Extract))?;
        Ok(Self {
            backend,
            options,
            name: UNNAMED.to_string(),
        })
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::from(e).at(Stage::Extract))?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Override the document name used in logs and output file names.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// PDF version from the file header.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Title from the document information dictionary.
    pub fn title(&self) -> Option<String> {
        self.backend.title()
    }

    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    /// Extract the raw spans without running the structural stages.
    pub fn extract(&self) -> Result<ExtractedDocument> {
        SpanExtractor::new(&self.backend, &self.options)
            .extract(&self.name)
            .map_err(|e| e.at(Stage::Extract))
    }

    /// Parse the document into blocks, page numbers, footnotes and a TOC.
    pub fn parse(&self) -> Result<ParsedDocument> {
        let extracted = self.extract()?;
        parse_spans(extracted, &self.options)
    }
}

/// Run the structural stages over already extracted spans.
///
/// A missing table of contents is not an error: it is logged and the
/// document comes back with an empty TOC.
pub fn parse_spans(doc: ExtractedDocument, options: &ParseOptions) -> Result<ParsedDocument> {
    if doc.spans.iter().all(Span::is_blank) {
        return Err(Error::EmptyDocument.at(Stage::Extract));
    }

    let size_tags = FontClassifier::new(options.granularity)
        .classify(&doc.spans)
        .map_err(|e| e.at(Stage::ClassifyFonts))?;
    let page_numbers = PageNumberSequencer::new(options).detect(&doc);
    let footnotes = FootnoteDetector::new(&size_tags).detect(&doc);
    let mut blocks =
        Reconstructor::new(&size_tags, &page_numbers, &footnotes, &options.thresholds).reconstruct(&doc);

    let mut toc = match TocExtractor::new(&options.thresholds).extract(&mut blocks, &page_numbers) {
        Ok(toc) => toc,
        Err(Error::TocNotFound) => {
            log::warn!("{}: no table of contents identified", doc.name);
            Vec::new()
        }
        Err(e) => return Err(e.at(Stage::Toc)),
    };
    if !toc.is_empty() {
        match_toc(
            &mut toc,
            &blocks,
            &page_numbers,
            options.thresholds.similarity_cutoff,
        );
    }

    let stats = DocumentStats {
        pages: doc.page_count(),
        spans: doc.spans.len(),
        size_tags: size_tags.len(),
        page_numbers: page_numbers.len(),
        footnotes: footnotes.len(),
        blocks: blocks.len(),
        toc_entries: toc.len(),
        toc_accuracy: DocumentStats::accuracy(&toc),
    };
    log::debug!(
        "{}: {} blocks, {} toc entries, accuracy {:.2}",
        doc.name,
        stats.blocks,
        stats.toc_entries,
        stats.toc_accuracy
    );

    Ok(ParsedDocument {
        name: doc.name,
        page_count: stats.pages,
        blocks,
        toc,
        page_numbers,
        footnotes,
        size_tags,
        stats,
    })
}
