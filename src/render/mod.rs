//! Output writers for parsed documents.
//!
//! Each document produces three files in the output directory:
//! `<name>_content.json` (blocks), `<name>_meta.json` (TOC entries) and
//! `<name>.md` (a tagged preview).

mod jsonl;
mod markdown;

pub use jsonl::{to_content_jsonl, to_meta_jsonl, write_content, write_meta};
pub use markdown::{render_block, to_markdown};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, Stage};
use crate::model::ParsedDocument;

/// Paths of the files written for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub content: PathBuf,
    pub meta: PathBuf,
    pub markdown: PathBuf,
}

impl OutputPaths {
    /// Output paths for a document name inside `dir`.
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            content: dir.join(format!("{}_content.json", name)),
            meta: dir.join(format!("{}_meta.json", name)),
            markdown: dir.join(format!("{}.md", name)),
        }
    }
}

/// Write the content, meta and preview files, creating `dir` if needed.
pub fn write_outputs<P: AsRef<Path>>(doc: &ParsedDocument, dir: P) -> Result<OutputPaths> {
    write_all(doc, dir.as_ref()).map_err(|e| e.at(Stage::Write))
}

fn write_all(doc: &ParsedDocument, dir: &Path) -> Result<OutputPaths> {
    fs::create_dir_all(dir)?;
    let paths = OutputPaths::new(dir, &doc.name);

    write_content(doc, BufWriter::new(File::create(&paths.content)?))?;
    write_meta(doc, BufWriter::new(File::create(&paths.meta)?))?;

    let mut md = BufWriter::new(File::create(&paths.markdown)?);
    md.write_all(to_markdown(doc).as_bytes())?;
    md.flush()?;

    log::debug!("{}: wrote {}", doc.name, paths.content.display());
    Ok(paths)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{
        BBox, Block, BlockType, DocumentStats, PageNumberSequence, SizeTag, SizeTagTable, Span,
        TocEntry,
    };
    use crate::parser::FontClassifier;

    pub(crate) fn sample_document() -> ParsedDocument {
        let blocks = vec![
            Block::new(
                "Introduction",
                BlockType::Header,
                SizeTag::Header(1),
                18.0,
                0,
                BBox::new(72.0, 80.0, 300.0, 100.0),
            ),
            Block::new(
                "The evaluation covers five years.",
                BlockType::Text,
                SizeTag::Paragraph,
                12.0,
                0,
                BBox::new(72.0, 110.0, 500.0, 122.0),
            ),
            Block::new(
                "1",
                BlockType::PageNumber,
                SizeTag::Paragraph,
                12.0,
                0,
                BBox::new(290.0, 770.0, 300.0, 782.0),
            ),
        ];
        let spans = vec![Span::new("body", BBox::default(), "Times", 12.0)];
        let size_tags: SizeTagTable = FontClassifier::new(false)
            .classify(&spans)
            .expect("one span classifies");

        ParsedDocument {
            name: "sample".to_string(),
            page_count: 1,
            blocks,
            toc: vec![TocEntry::new("Introduction", "1")],
            page_numbers: PageNumberSequence::default(),
            footnotes: Vec::new(),
            size_tags,
            stats: DocumentStats::default(),
        }
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("parsed");
        let doc = sample_document();

        let paths = write_outputs(&doc, &out).unwrap();
        assert_eq!(paths, OutputPaths::new(&out, "sample"));

        let content = fs::read_to_string(&paths.content).unwrap();
        assert_eq!(content.lines().count(), 3);
        let meta = fs::read_to_string(&paths.meta).unwrap();
        assert_eq!(meta.lines().count(), 1);
        let md = fs::read_to_string(&paths.markdown).unwrap();
        assert!(md.contains("<p><b>p. 1</b></p>"));
    }

    #[test]
    fn test_write_failure_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let err = write_outputs(&sample_document(), blocker.join("sub")).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Write));
        assert!(matches!(err.root(), Error::Io(_)));
    }
}
