//! Benchmarks for pdfstruct parsing performance.
//!
//! Run with: cargo bench
//!
//! The structural stages run over synthetic span documents so the numbers
//! do not depend on content-stream decoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pdfstruct::model::PageGeometry;
use pdfstruct::parser::token_sort_ratio;
use pdfstruct::{BBox, ExtractedDocument, ParseOptions, Span};

/// Creates a minimal PDF with the given number of pages.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut content = String::new();
    content.push_str("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 3)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_count
    ));

    let mut next_obj = 3;
    for i in 0..page_count {
        let page_obj = next_obj;
        let content_obj = next_obj + 1;
        next_obj += 2;

        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));
        let text = format!(
            "BT /F1 12 Tf 72 700 Td (Body text of page {} in the benchmark report.) Tj ET BT /F1 10 Tf 300 40 Td ({}) Tj ET",
            i + 1,
            i + 1
        );
        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    // Offsets are placeholders; lopdf rebuilds the table when they are wrong.
    let xref_offset = content.len();
    content.push_str(&format!("xref\n0 {}\n", next_obj));
    content.push_str("0000000000 65535 f \n");
    for _ in 1..next_obj {
        content.push_str("0000000000 00000 n \n");
    }
    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        next_obj, xref_offset
    ));

    content.into_bytes()
}

/// A report with a dotted contents page, one chapter per page and footers.
fn synthetic_report(chapters: usize) -> ExtractedDocument {
    let mut doc = ExtractedDocument::new("bench");
    let pages = chapters + 2;
    doc.pages = vec![PageGeometry::new(600.0, 800.0); pages];

    let span = |text: String, page: usize, block: usize, line: usize, y: f32, size: f32| {
        let width = text.chars().count() as f32 * size * 0.5;
        Span::new(text, BBox::new(72.0, y, 72.0 + width, y + size), "Times", size)
            .on_page(page)
            .at_line(block, line)
    };
    let footer = |page: usize, block: usize| {
        Span::new((page + 1).to_string(), BBox::new(290.0, 770.0, 300.0, 780.0), "Times", 10.0)
            .on_page(page)
            .at_line(block, 0)
    };

    doc.spans.push(span("Evaluation of Sector Support".into(), 0, 0, 0, 100.0, 20.0));
    doc.spans.push(footer(0, 1));

    for c in 0..chapters {
        let text = format!("{} Chapter number {} ........ {}", c + 1, c + 1, c + 3);
        doc.spans.push(span(text, 1, 0, c, 100.0 + 14.0 * c as f32, 12.0));
    }
    doc.spans.push(footer(1, 1));

    for c in 0..chapters {
        let page = c + 2;
        doc.spans.push(span(format!("Chapter number {}", c + 1), page, 0, 0, 80.0, 16.0));
        for line in 0..20 {
            let text = format!("Line {} of the discussion in chapter {} continues here", line, c + 1);
            doc.spans.push(span(text, page, 1, line, 120.0 + 14.0 * line as f32, 12.0));
        }
        doc.spans.push(footer(page, 2));
    }
    doc
}

fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| pdfstruct::is_pdf_bytes(black_box(&pdf_data)));
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| pdfstruct::is_pdf_bytes(black_box(non_pdf_data)));
    });
}

fn bench_pdf_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_parsing");

    for page_count in [1, 5, 10] {
        let data = create_test_pdf(page_count);
        group.bench_with_input(BenchmarkId::from_parameter(page_count), &data, |b, data| {
            b.iter(|| {
                let options = ParseOptions::new().lenient();
                let _ = pdfstruct::parse_bytes_with_options(black_box(data), options);
            });
        });
    }

    group.finish();
}

fn bench_structural_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_spans");

    for chapters in [5, 20, 50] {
        let doc = synthetic_report(chapters);
        let options = ParseOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(chapters), &doc, |b, doc| {
            b.iter(|| pdfstruct::parse_spans(black_box(doc.clone()), &options));
        });
    }

    group.finish();
}

fn bench_token_sort_ratio(c: &mut Criterion) {
    c.bench_function("token_sort_ratio", |b| {
        b.iter(|| {
            token_sort_ratio(
                black_box("4.2 Results of the evaluation of sector support"),
                black_box("Results of the evaluation of the sector support programme"),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_pdf_parsing,
    bench_structural_stages,
    bench_token_sort_ratio,
);
criterion_main!(benches);
