//! Low-level text spans and page geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with a top-left origin (y grows downward).
///
/// Serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Outer envelope of two boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// A contiguous run of text sharing one font, size and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Text content (may be whitespace only)
    pub text: String,
    /// Position on the page
    pub bbox: BBox,
    /// Base font name
    pub font: String,
    /// Font size in points, already bucketed
    pub size: f32,
    /// Fill color as 0xRRGGBB
    pub color: u32,
    /// Zero-based page index
    pub page_id: usize,
    /// Block index within the page
    pub block_id: usize,
    /// Line index within the block
    pub line_id: usize,
}

impl Span {
    /// Create a span with black color at block/line zero.
    pub fn new(text: impl Into<String>, bbox: BBox, font: impl Into<String>, size: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            font: font.into(),
            size,
            color: 0,
            page_id: 0,
            block_id: 0,
            line_id: 0,
        }
    }

    /// Set page index.
    pub fn on_page(mut self, page_id: usize) -> Self {
        self.page_id = page_id;
        self
    }

    /// Set block and line indices.
    pub fn at_line(mut self, block_id: usize, line_id: usize) -> Self {
        self.block_id = block_id;
        self.line_id = line_id;
        self
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Whether the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Page/block/line triple used for line-change detection.
    pub fn line_key(&self) -> (usize, usize, usize) {
        (self.page_id, self.block_id, self.line_id)
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Portrait orientation.
    pub fn is_vertical(&self) -> bool {
        self.height > self.width
    }
}

impl Default for PageGeometry {
    /// US Letter, portrait.
    fn default() -> Self {
        Self::new(612.0, 792.0)
    }
}

/// Raw output of the span extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Document name (file stem)
    pub name: String,
    /// Spans in reading order
    pub spans: Vec<Span>,
    /// One entry per page
    pub pages: Vec<PageGeometry>,
}

impl ExtractedDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether a page is portrait. Unknown pages count as portrait.
    pub fn is_vertical(&self, page_id: usize) -> bool {
        self.pages
            .get(page_id)
            .map(PageGeometry::is_vertical)
            .unwrap_or(true)
    }
}
