//! Font keys and size tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Histogram key: font size, plus the font name when granularity is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontKey {
    pub size: f32,
    pub font: Option<String>,
}

impl FontKey {
    /// Key on size only.
    pub fn size(size: f32) -> Self {
        Self { size, font: None }
    }

    /// Key on size and font name.
    pub fn with_font(size: f32, font: impl Into<String>) -> Self {
        Self {
            size,
            font: Some(font.into()),
        }
    }
}

impl PartialEq for FontKey {
    fn eq(&self, other: &Self) -> bool {
        self.size.to_bits() == other.size.to_bits() && self.font == other.font
    }
}

impl Eq for FontKey {}

impl Hash for FontKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.size.to_bits().hash(state);
        self.font.hash(state);
    }
}

/// Size classification of a span or block.
///
/// Rendered as `<h1>`, `<p>`, `<s2>` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SizeTag {
    /// Larger than body text; 1 is the largest.
    Header(u16),
    /// Body text.
    Paragraph,
    /// Smaller than body text; 1 is the closest to body size.
    Subscript(u16),
}

impl SizeTag {
    pub fn is_header(&self) -> bool {
        matches!(self, SizeTag::Header(_))
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, SizeTag::Paragraph)
    }

    pub fn is_subscript(&self) -> bool {
        matches!(self, SizeTag::Subscript(_))
    }
}

impl fmt::Display for SizeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeTag::Header(n) => write!(f, "<h{}>", n),
            SizeTag::Paragraph => f.write_str("<p>"),
            SizeTag::Subscript(n) => write!(f, "<s{}>", n),
        }
    }
}

/// Error returned when a string is not a size tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeTagError(String);

impl fmt::Display for ParseSizeTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid size tag: {}", self.0)
    }
}

impl std::error::Error for ParseSizeTagError {}

impl FromStr for SizeTag {
    type Err = ParseSizeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSizeTagError(s.to_string());
        let inner = s
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(err)?;

        if inner == "p" {
            return Ok(SizeTag::Paragraph);
        }
        let mut chars = inner.chars();
        let kind = chars.next();
        let level: u16 = chars.as_str().parse().map_err(|_| err())?;
        match kind {
            Some('h') if level > 0 => Ok(SizeTag::Header(level)),
            Some('s') if level > 0 => Ok(SizeTag::Subscript(level)),
            _ => Err(err()),
        }
    }
}

impl From<SizeTag> for String {
    fn from(tag: SizeTag) -> Self {
        tag.to_string()
    }
}

impl TryFrom<String> for SizeTag {
    type Error = ParseSizeTagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One histogram bucket and the tag assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTagEntry {
    pub key: FontKey,
    pub count: usize,
    pub tag: SizeTag,
}

/// Mapping from font key to size tag, built once per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTagTable {
    /// Buckets in first-seen order
    pub entries: Vec<SizeTagEntry>,
    /// The most frequent key
    pub body: FontKey,
    /// Whether keys include the font name
    pub granularity: bool,
}

impl SizeTagTable {
    /// Key a span's size and font the way this table was built.
    pub fn key_for(&self, size: f32, font: &str) -> FontKey {
        if self.granularity {
            FontKey::with_font(size, font)
        } else {
            FontKey::size(size)
        }
    }

    /// Tag for a size/font pair. Unknown keys are treated as body text.
    pub fn tag_for(&self, size: f32, font: &str) -> SizeTag {
        let key = self.key_for(size, font);
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.tag)
            .unwrap_or(SizeTag::Paragraph)
    }

    /// Body text size.
    pub fn body_size(&self) -> f32 {
        self.body.size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of header levels.
    pub fn header_levels(&self) -> usize {
        self.entries.iter().filter(|e| e.tag.is_header()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_size_tag_display_and_parse() {
        for tag in [SizeTag::Header(3), SizeTag::Paragraph, SizeTag::Subscript(1)] {
            assert_eq!(tag.to_string().parse::<SizeTag>().unwrap(), tag);
        }
        assert_eq!(SizeTag::Header(12).to_string(), "<h12>");
        assert!("<x1>".parse::<SizeTag>().is_err());
        assert!("<h0>".parse::<SizeTag>().is_err());
        assert!("p".parse::<SizeTag>().is_err());
    }

    #[test]
    fn test_size_tag_serde() {
        let json = serde_json::to_string(&SizeTag::Subscript(2)).unwrap();
        assert_eq!(json, "\"<s2>\"");
        let tag: SizeTag = serde_json::from_str("\"<h1>\"").unwrap();
        assert_eq!(tag, SizeTag::Header(1));
    }

    #[test]
    fn test_font_key_hashing() {
        let mut keys = HashSet::new();
        keys.insert(FontKey::size(12.0));
        keys.insert(FontKey::size(12.0));
        keys.insert(FontKey::with_font(12.0, "Arial"));
        assert_eq!(keys.len(), 2);
    }
}
