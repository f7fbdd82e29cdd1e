//! Error types for pdfstruct.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for pdfstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage in which a fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening the file and reading text spans.
    Extract,
    /// Building the size-tag table.
    ClassifyFonts,
    /// Page-number sequence detection.
    PageNumbers,
    /// Footnote detection.
    Footnotes,
    /// Block reconstruction.
    Reconstruct,
    /// Table-of-contents extraction.
    Toc,
    /// Matching TOC entries to blocks.
    Match,
    /// Writing output files.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::ClassifyFonts => "classify-fonts",
            Stage::PageNumbers => "page-numbers",
            Stage::Footnotes => "footnotes",
            Stage::Reconstruct => "reconstruct",
            Stage::Toc => "toc",
            Stage::Match => "match",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Error types that can occur while parsing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is unreadable or not a well-formed PDF.
    #[error("Cannot open document: {0}")]
    DocumentOpen(String),

    /// The document contains no text spans.
    #[error("Document contains no text spans")]
    EmptyDocument,

    /// The font histogram is empty.
    #[error("Zero discriminating fonts found")]
    NoFontsFound,

    /// No table of contents could be located. Never fatal.
    #[error("No table of contents identified")]
    TocNotFound,

    /// Output serialization failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The document exceeded its wall-clock budget.
    #[error("Parsing exceeded {0} seconds")]
    Timeout(u64),

    /// A fatal error tagged with the stage it came from.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Tag this error with the pipeline stage it occurred in.
    ///
    /// Already-tagged errors keep their original stage.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage this error was tagged with, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with any stage tag removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::DocumentOpen(err.to_string()),
        }
    }
}
