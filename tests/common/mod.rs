//! Synthetic span documents shared by the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfstruct::{BBox, ExtractedDocument, Span};
use pdfstruct::model::PageGeometry;

/// Lays out spans on one page, top to bottom.
pub struct Page {
    pub spans: Vec<Span>,
    page: usize,
    block: usize,
    line: usize,
    y: f32,
}

impl Page {
    pub fn new(page: usize) -> Self {
        Self {
            spans: Vec::new(),
            page,
            block: 0,
            line: 0,
            y: 100.0,
        }
    }

    pub fn span(&mut self, text: &str, size: f32, x: f32) -> &mut Self {
        let width = text.chars().count() as f32 * size * 0.5;
        self.spans.push(
            Span::new(text, BBox::new(x, self.y, x + width, self.y + size), "Times", size)
                .on_page(self.page)
                .at_line(self.block, self.line),
        );
        self
    }

    pub fn next_line(&mut self) -> &mut Self {
        self.line += 1;
        self.y += 14.0;
        self
    }

    pub fn next_block(&mut self, gap: f32) -> &mut Self {
        self.block += 1;
        self.line = 0;
        self.y += gap;
        self
    }

    /// Printed page number in the bottom margin.
    pub fn footer(&mut self, text: &str) -> &mut Self {
        self.block += 1;
        self.line = 0;
        self.spans.push(
            Span::new(text, BBox::new(290.0, 770.0, 300.0, 780.0), "Times", 10.0)
                .on_page(self.page)
                .at_line(self.block, self.line),
        );
        self
    }
}

pub fn document(name: &str, pages: Vec<Page>) -> ExtractedDocument {
    let mut doc = ExtractedDocument::new(name);
    for page in pages {
        doc.pages.push(PageGeometry::new(600.0, 800.0));
        doc.spans.extend(page.spans);
    }
    doc
}

/// A six page report: title page, dotted contents, three chapters and an
/// annex page, numbered 1 to 6 in the footer.
pub fn evaluation_report() -> ExtractedDocument {
    let mut contents = Page::new(1);
    contents
        .span("Contents", 16.0, 72.0)
        .next_block(30.0)
        .span("1 Introduction ........ 3", 12.0, 72.0)
        .next_line()
        .span("2 Findings ........ 4", 12.0, 72.0)
        .next_line()
        .span("3 Conclusions ........ 5", 12.0, 72.0)
        .footer("2");
    report(contents)
}

/// The same report with a "Table of Contents" page that has no dot leaders:
/// each row draws its section, heading and page number as separate spans.
pub fn heading_list_report() -> ExtractedDocument {
    let mut contents = Page::new(1);
    contents.span("Table of Contents", 16.0, 72.0).next_block(30.0);
    for (i, (section, heading, page)) in [
        ("1", "Introduction", "3"),
        ("2", "Findings", "4"),
        ("3", "Conclusions", "5"),
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            contents.next_line();
        }
        contents
            .span(section, 12.0, 72.0)
            .span(heading, 12.0, 100.0)
            .span(page, 12.0, 400.0);
    }
    contents.footer("2");
    report(contents)
}

/// Title page, the given contents page, three chapters and an annex.
pub fn report(contents: Page) -> ExtractedDocument {
    let mut title = Page::new(0);
    title.span("Annual Evaluation Report", 20.0, 72.0).footer("1");

    let chapter = |page: usize, heading: &str, first: &str, second: &str, number: &str| {
        let mut p = Page::new(page);
        p.span(heading, 16.0, 72.0)
            .next_block(30.0)
            .span(first, 12.0, 72.0)
            .next_line()
            .span(second, 12.0, 72.0)
            .footer(number);
        p
    };

    let mut annex = Page::new(5);
    annex
        .span("Annex material is listed on this page", 12.0, 72.0)
        .next_line()
        .span("for reference only.", 12.0, 72.0)
        .footer("6");

    document(
        "evaluation",
        vec![
            title,
            contents,
            chapter(
                2,
                "Introduction",
                "The evaluation looks at five years of support",
                "to municipal water services.",
                "3",
            ),
            chapter(
                3,
                "Findings",
                "Results were mixed across the regions",
                "visited during fieldwork.",
                "4",
            ),
            chapter(
                4,
                "Conclusions",
                "The programme should continue with a",
                "stronger focus on maintenance.",
                "5",
            ),
            annex,
        ],
    )
}

/// Text operations placing each string on one baseline, `step` points apart.
pub fn text_row(strings: &[&str], step: f32) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 700.into()]),
    ];
    for (i, text) in strings.iter().enumerate() {
        if i > 0 {
            ops.push(Operation::new("Td", vec![step.into(), 0.into()]));
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// A one-page PDF in Helvetica drawing the given content operations.
pub fn pdf_bytes(operations: Vec<Operation>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
