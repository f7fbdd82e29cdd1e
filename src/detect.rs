//! PDF header sniffing.
//!
//! Cheap checks run before handing bytes to the PDF backend so that
//! non-PDF inputs fail with a clear [`Error::DocumentOpen`].

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Return the PDF version declared in the file header (e.g. `"1.7"`).
pub fn pdf_version(data: &[u8]) -> Result<String> {
    let header_len = PDF_MAGIC.len() + VERSION_LEN;
    if data.len() < header_len || !data.starts_with(PDF_MAGIC) {
        return Err(Error::DocumentOpen("missing %PDF- header".to_string()));
    }

    let version = &data[PDF_MAGIC.len()..header_len];
    let valid = version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit();
    if !valid {
        return Err(Error::DocumentOpen(format!(
            "malformed PDF version {:?}",
            String::from_utf8_lossy(version)
        )));
    }

    Ok(String::from_utf8_lossy(version).into_owned())
}

/// Read the first bytes of a file and return its PDF version.
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    pdf_version(&header)
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_ok()
}
