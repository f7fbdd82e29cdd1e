//! JSON Lines output: one block or TOC entry per line.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::model::{ParsedDocument, TocEntry};

/// A TOC entry as written to the meta sidecar.
#[derive(Debug, Serialize)]
struct TocRecord<'a> {
    #[serde(flatten)]
    entry: &'a TocEntry,
    #[serde(rename = "type")]
    record_type: &'static str,
    /// Filled in by downstream classification
    category: Vec<String>,
}

impl<'a> From<&'a TocEntry> for TocRecord<'a> {
    fn from(entry: &'a TocEntry) -> Self {
        Self {
            entry,
            record_type: "toc",
            category: Vec::new(),
        }
    }
}

/// Write every block as one JSON object per line.
pub fn write_content<W: Write>(doc: &ParsedDocument, mut writer: W) -> Result<()> {
    for block in &doc.blocks {
        serde_json::to_writer(&mut writer, block)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every TOC entry as one JSON object per line.
pub fn write_meta<W: Write>(doc: &ParsedDocument, mut writer: W) -> Result<()> {
    for entry in &doc.toc {
        serde_json::to_writer(&mut writer, &TocRecord::from(entry))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Blocks as a JSON Lines string.
pub fn to_content_jsonl(doc: &ParsedDocument) -> Result<String> {
    let mut buf = Vec::new();
    write_content(doc, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// TOC entries as a JSON Lines string.
pub fn to_meta_jsonl(doc: &ParsedDocument) -> Result<String> {
    let mut buf = Vec::new();
    write_meta(doc, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
