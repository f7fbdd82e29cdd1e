//! End-to-end tests from PDF bytes through content-stream extraction.

mod common;

use common::{pdf_bytes, text_row};
use pdfstruct::{parse_bytes, BlockType};

#[test]
fn test_words_drawn_apart_keep_their_spaces() {
    let pdf = pdf_bytes(text_row(&["Water", "supply", "programme"], 60.0));
    let doc = parse_bytes(&pdf).unwrap();

    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].block_type, BlockType::Text);
    assert_eq!(doc.blocks[0].text, "Water supply programme");
}

#[test]
fn test_touching_runs_join_without_a_space() {
    // "Wat" is 3 glyphs of 6pt, so "er" starts where it ends
    let pdf = pdf_bytes(text_row(&["Wat", "er supply"], 18.0));
    let doc = parse_bytes(&pdf).unwrap();

    assert_eq!(doc.blocks[0].text, "Water supply");
}
