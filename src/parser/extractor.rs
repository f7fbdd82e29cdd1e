//! Span extraction from PDF content streams.
//!
//! Interprets the text-related operators of each page's content stream and
//! emits one [`Span`] per text-show operation, with a top-left origin and
//! block/line indices derived from baselines.

use crate::error::{Error, Result};
use crate::model::{BBox, ExtractedDocument, PageGeometry, Span};

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};
use super::options::{ErrorMode, ParseOptions};

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
/// Ascent and descent as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;
/// Baselines closer than this fraction of the size share a line.
const SAME_LINE: f32 = 0.3;
/// Baseline drops larger than this multiple of the size start a new block.
const BLOCK_GAP: f32 = 1.6;
/// TJ adjustment (thousandths of an em) treated as a word space.
const TJ_SPACE: f32 = 200.0;

/// Reads spans from every page of a backend.
pub struct SpanExtractor<'a, B: PdfBackend> {
    backend: &'a B,
    options: &'a ParseOptions,
}

impl<'a, B: PdfBackend> SpanExtractor<'a, B> {
    pub fn new(backend: &'a B, options: &'a ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Extract every page.
    ///
    /// Fails with [`Error::EmptyDocument`] when no page yields visible text.
    pub fn extract(&self, name: &str) -> Result<ExtractedDocument> {
        let mut doc = ExtractedDocument::new(name);

        for (page_idx, (page_num, page_id)) in self.backend.pages().into_iter().enumerate() {
            let geometry = self.backend.page_geometry(page_id);
            doc.pages.push(geometry);

            match self.extract_page(page_idx, page_id, geometry) {
                Ok(spans) => doc.spans.extend(spans),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("{}: skipping page {}: {}", name, page_num, e);
                }
                Err(e) => return Err(e),
            }
        }

        if doc.spans.iter().all(Span::is_blank) {
            return Err(Error::EmptyDocument);
        }

        log::debug!(
            "{}: extracted {} spans from {} pages",
            name,
            doc.spans.len(),
            doc.page_count()
        );
        Ok(doc)
    }

    /// Extract one page's spans in content-stream order.
    pub fn extract_page(
        &self,
        page_idx: usize,
        page_id: PageId,
        geometry: PageGeometry,
    ) -> Result<Vec<Span>> {
        let fonts = self.backend.page_fonts(page_id)?;
        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;

        let mut interpreter = Interpreter::default();
        let raw = interpreter.run(&ops, |res, bytes| {
            let font = fonts
                .iter()
                .find(|f| f.name == res)
                .map(|f| f.base_font.clone())
                .unwrap_or_else(|| String::from_utf8_lossy(res).to_string());
            (font, self.backend.decode_text(page_id, res, bytes))
        });

        Ok(layout_spans(raw, page_idx, geometry, self.options))
    }
}

/// Text shown by one operator, in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawSpan {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub color: u32,
    pub x: f32,
    pub width: f32,
    pub baseline: f32,
}

/// Affine text matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Matrix {
    fn from_operands(op: &ContentOp) -> Self {
        Self {
            a: op.number(0).unwrap_or(1.0),
            b: op.number(1).unwrap_or(0.0),
            c: op.number(2).unwrap_or(0.0),
            d: op.number(3).unwrap_or(1.0),
            e: op.number(4).unwrap_or(0.0),
            f: op.number(5).unwrap_or(0.0),
        }
    }

    fn translate(&self, tx: f32, ty: f32) -> Self {
        Self {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..*self
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state carried across operators.
#[derive(Debug, Default)]
struct Interpreter {
    in_text: bool,
    tm: Matrix,
    tlm: Matrix,
    leading: f32,
    font_res: Vec<u8>,
    font_size: f32,
    color: u32,
    color_stack: Vec<u32>,
    spans: Vec<RawSpan>,
}

impl Interpreter {
    /// Run the operators, decoding strings with `decode(font_resource, bytes)`,
    /// which returns (base font name, text).
    fn run<F>(&mut self, ops: &[ContentOp], mut decode: F) -> Vec<RawSpan>
    where
        F: FnMut(&[u8], &[u8]) -> (String, String),
    {
        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    self.in_text = true;
                    self.tm = Matrix::default();
                    self.tlm = Matrix::default();
                }
                "ET" => self.in_text = false,
                "q" => self.color_stack.push(self.color),
                "Q" => {
                    if let Some(color) = self.color_stack.pop() {
                        self.color = color;
                    }
                }
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        self.font_res = name.clone();
                    }
                    self.font_size = op.number(1).unwrap_or(12.0);
                }
                "TL" => self.leading = op.number(0).unwrap_or(0.0),
                "Td" | "TD" => {
                    let tx = op.number(0).unwrap_or(0.0);
                    let ty = op.number(1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.move_line(tx, ty);
                }
                "Tm" => {
                    self.tlm = Matrix::from_operands(op);
                    self.tm = self.tlm;
                }
                "T*" => self.next_line(),
                "g" => self.color = gray(op.number(0)),
                "rg" => self.color = rgb(op.number(0), op.number(1), op.number(2)),
                "k" => {
                    self.color = cmyk(op.number(0), op.number(1), op.number(2), op.number(3))
                }
                "sc" | "scn" => {
                    let comps: Vec<f32> = op.operands.iter().filter_map(PdfValue::as_f32).collect();
                    self.color = match comps.as_slice() {
                        [v] => gray(Some(*v)),
                        [r, g, b] => rgb(Some(*r), Some(*g), Some(*b)),
                        [c, m, y, k] => cmyk(Some(*c), Some(*m), Some(*y), Some(*k)),
                        _ => self.color,
                    };
                }
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        self.show(&[PdfValue::Str(bytes.clone())], &mut decode);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        self.show(items, &mut decode);
                    }
                }
                "'" | "\"" => {
                    self.next_line();
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(idx) {
                        self.show(&[PdfValue::Str(bytes.clone())], &mut decode);
                    }
                }
                _ => {}
            }
        }
        std::mem::take(&mut self.spans)
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = self.tlm.translate(tx, ty);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    /// Show a TJ-style array of strings and kerning adjustments.
    fn show<F>(&mut self, items: &[PdfValue], decode: &mut F)
    where
        F: FnMut(&[u8], &[u8]) -> (String, String),
    {
        if !self.in_text {
            return;
        }

        let mut text = String::new();
        let mut font = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let (base_font, decoded) = decode(&self.font_res, bytes);
                    advance += decoded.chars().count() as f32 * self.font_size * GLYPH_WIDTH;
                    text.push_str(&decoded);
                    font = base_font;
                }
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let adjustment = -item.as_f32().unwrap_or(0.0);
                    advance += adjustment / 1000.0 * self.font_size;
                    if adjustment > TJ_SPACE && !text.is_empty() && !text.ends_with(char::is_whitespace) {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        if text.is_empty() {
            return;
        }

        let hscale = self.tm.horizontal_scale();
        self.spans.push(RawSpan {
            text,
            font,
            size: self.font_size * self.tm.vertical_scale(),
            color: self.color,
            x: self.tm.e,
            width: advance * hscale,
            baseline: self.tm.f,
        });
        self.tm = self.tm.translate(advance, 0.0);
    }
}

fn channel(v: Option<f32>) -> u32 {
    (v.unwrap_or(0.0).clamp(0.0, 1.0) * 255.0).round() as u32
}

fn rgb(r: Option<f32>, g: Option<f32>, b: Option<f32>) -> u32 {
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

fn gray(v: Option<f32>) -> u32 {
    rgb(v, v, v)
}

fn cmyk(c: Option<f32>, m: Option<f32>, y: Option<f32>, k: Option<f32>) -> u32 {
    let k = k.unwrap_or(0.0).clamp(0.0, 1.0);
    let conv = |v: Option<f32>| Some((1.0 - v.unwrap_or(0.0).clamp(0.0, 1.0)) * (1.0 - k));
    rgb(conv(c), conv(m), conv(y))
}

/// Convert raw spans to page coordinates and assign block/line indices.
pub(crate) fn layout_spans(
    raw: Vec<RawSpan>,
    page_idx: usize,
    geometry: PageGeometry,
    options: &ParseOptions,
) -> Vec<Span> {
    let mut spans = Vec::with_capacity(raw.len());
    let mut block_id = 0;
    let mut line_id = 0;
    let mut prev: Option<(f32, f32)> = None; // (baseline, size)

    for r in raw {
        if let Some((prev_baseline, prev_size)) = prev {
            let tolerance = SAME_LINE * prev_size.max(r.size);
            let drop = prev_baseline - r.baseline;
            if drop.abs() > tolerance {
                if drop < 0.0 || drop > BLOCK_GAP * prev_size {
                    block_id += 1;
                    line_id = 0;
                } else {
                    line_id += 1;
                }
            }
        }
        prev = Some((r.baseline, r.size));

        let h = geometry.height;
        let bbox = BBox::new(
            r.x,
            h - (r.baseline + ASCENT * r.size),
            r.x + r.width,
            h - (r.baseline - DESCENT * r.size),
        );
        spans.push(Span {
            text: r.text,
            bbox,
            font: r.font,
            size: options.bucket_size(r.size),
            color: r.color,
            page_id: page_idx,
            block_id,
            line_id,
        });
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::backend::BackendFontInfo;
    use std::collections::BTreeMap;

    /// Backend serving canned operator lists, one per page.
    struct MockBackend {
        pages: Vec<Result<Vec<ContentOp>>>,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (0..self.pages.len() as u32)
                .map(|i| (i + 1, (i + 1, 0)))
                .collect()
        }

        fn page_geometry(&self, _page: PageId) -> PageGeometry {
            PageGeometry::new(600.0, 800.0)
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![BackendFontInfo {
                name: b"F1".to_vec(),
                base_font: "Times-Roman".to_string(),
            }])
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            Ok(vec![page.0 as u8])
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
            match &self.pages[data[0] as usize - 1] {
                Ok(ops) => Ok(ops.clone()),
                Err(_) => Err(Error::DocumentOpen("bad stream".to_string())),
            }
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }
    }

    fn op(name: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(name, operands)
    }

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn tf(size: f32) -> ContentOp {
        op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(size)])
    }

    fn paragraph_page() -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            tf(10.0),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![s("First line")]),
            op("Tj", vec![s(" continues")]),
            op("Td", vec![num(0.0), num(-12.0)]),
            op("Tj", vec![s("Second line")]),
            op("Td", vec![num(0.0), num(-40.0)]),
            op("rg", vec![num(1.0), num(0.0), num(0.0)]),
            op("Tj", vec![s("New block")]),
            op("ET", vec![]),
        ]
    }

    #[test]
    fn test_extract_assigns_lines_and_blocks() {
        let backend = MockBackend {
            pages: vec![Ok(paragraph_page())],
        };
        let options = ParseOptions::default();
        let doc = SpanExtractor::new(&backend, &options).extract("doc").unwrap();

        assert_eq!(doc.page_count(), 1);
        let keys: Vec<_> = doc.spans.iter().map(|s| (s.block_id, s.line_id)).collect();
        assert_eq!(keys, vec![(0, 0), (0, 0), (0, 1), (1, 0)]);
        assert_eq!(doc.spans[0].font, "Times-Roman");
        assert_eq!(doc.spans[3].color, 0xFF0000);
    }

    #[test]
    fn test_coordinates_are_top_down() {
        let backend = MockBackend {
            pages: vec![Ok(paragraph_page())],
        };
        let options = ParseOptions::default();
        let doc = SpanExtractor::new(&backend, &options).extract("doc").unwrap();

        let first = &doc.spans[0];
        // baseline 700 on an 800pt page
        assert!((first.bbox.y0 - 92.0).abs() < 1e-3);
        assert!((first.bbox.y1 - 102.0).abs() < 1e-3);
        assert!((first.bbox.x0 - 72.0).abs() < 1e-3);
        // "First line" is 10 glyphs at 5pt each
        assert!((first.bbox.x1 - 122.0).abs() < 1e-3);
        // next span starts where the first ended
        assert!((doc.spans[1].bbox.x0 - 122.0).abs() < 1e-3);
        assert!(doc.spans[2].bbox.y0 > first.bbox.y0);
    }

    #[test]
    fn test_tj_array_inserts_word_space() {
        let ops = vec![
            op("BT", vec![]),
            tf(12.0),
            op(
                "TJ",
                vec![PdfValue::Array(vec![s("Hello"), PdfValue::Integer(-250), s("world")])],
            ),
            op("ET", vec![]),
        ];
        let backend = MockBackend { pages: vec![Ok(ops)] };
        let options = ParseOptions::default();
        let doc = SpanExtractor::new(&backend, &options).extract("doc").unwrap();
        assert_eq!(doc.spans.len(), 1);
        assert_eq!(doc.spans[0].text, "Hello world");
    }

    #[test]
    fn test_blank_spans_are_kept_but_not_counted() {
        let ops = vec![
            op("BT", vec![]),
            tf(12.0),
            op("Tj", vec![s("  ")]),
            op("ET", vec![]),
        ];
        let backend = MockBackend { pages: vec![Ok(ops)] };
        let options = ParseOptions::default();
        let result = SpanExtractor::new(&backend, &options).extract("doc");
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_lenient_mode_skips_bad_pages() {
        let backend = MockBackend {
            pages: vec![
                Err(Error::DocumentOpen("x".to_string())),
                Ok(paragraph_page()),
            ],
        };

        let strict = ParseOptions::default();
        assert!(SpanExtractor::new(&backend, &strict).extract("doc").is_err());

        let lenient = ParseOptions::new().lenient();
        let doc = SpanExtractor::new(&backend, &lenient).extract("doc").unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.spans.iter().all(|s| s.page_id == 1));
    }

    #[test]
    fn test_size_bucketing_and_matrix_scale() {
        let ops = vec![
            op("BT", vec![]),
            tf(1.0),
            op(
                "Tm",
                vec![num(11.6), num(0.0), num(0.0), num(11.6), num(72.0), num(500.0)],
            ),
            op("Tj", vec![s("Scaled")]),
            op("ET", vec![]),
        ];
        let backend = MockBackend { pages: vec![Ok(ops)] };
        let options = ParseOptions::new().with_font_size_remainder(0);
        let doc = SpanExtractor::new(&backend, &options).extract("doc").unwrap();
        assert_eq!(doc.spans[0].size, 12.0);
    }

    #[test]
    fn test_color_operators() {
        assert_eq!(gray(Some(1.0)), 0xFFFFFF);
        assert_eq!(rgb(Some(0.0), Some(0.0), Some(1.0)), 0x0000FF);
        assert_eq!(cmyk(Some(0.0), Some(0.0), Some(0.0), Some(1.0)), 0x000000);
        assert_eq!(cmyk(Some(1.0), Some(0.0), Some(0.0), Some(0.0)), 0x00FFFF);
    }
}
