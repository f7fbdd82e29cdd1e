//! Markdown preview: every block wrapped in its size tag.

use crate::model::{Block, BlockType, ParsedDocument, SizeTag};

/// Render a document as a Markdown preview, one block per line.
pub fn to_markdown(doc: &ParsedDocument) -> String {
    let mut output = String::new();
    for block in &doc.blocks {
        output.push_str(&render_block(block));
        output.push('\n');
    }
    output
}

/// Render one block.
///
/// Page numbers are bold, footnote parts italic. Subscript-sized blocks become
/// a paragraph carrying their font size inline.
pub fn render_block(block: &Block) -> String {
    let text = match block.block_type {
        BlockType::PageNumber => format!("<b>p. {}</b>", block.text),
        BlockType::FootnoteId | BlockType::FootnoteText | BlockType::FootnoteTextId => {
            format!("<i>{}</i>", block.text)
        }
        _ => block.text.clone(),
    };

    match block.tag {
        SizeTag::Subscript(_) => {
            format!("<p style='font-size:{}px'>{}</p>", block.size.round() as i64, text)
        }
        tag => {
            let open = tag.to_string();
            format!("{}{}</{}", open, text, &open[1..])
        }
    }
}
