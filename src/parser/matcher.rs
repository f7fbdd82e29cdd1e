//! Links TOC entries to the body blocks they name.

use strsim::normalized_levenshtein;
use unicode_normalization::UnicodeNormalization;

use crate::model::{Block, PageNumberSequence, TocEntry, TocMatch};

/// Lowercased, NFKC-normalized tokens, sorted and joined by single spaces.
fn sorted_tokens(text: &str) -> String {
    let folded: String = text
        .nfkc()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn ratio(a: &str, b: &str) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (normalized_levenshtein(a, b) * 100.0).round() as u32
}

/// Similarity of two strings regardless of word order, 0 to 100.
pub fn token_sort_ratio(a: &str, b: &str) -> u32 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Fills `toc_match` on every entry.
///
/// The best body block in the whole document wins; the first one on ties.
/// When that scores below `cutoff`, the body blocks on the page the entry
/// points to are searched instead.
pub fn match_toc(toc: &mut [TocEntry], blocks: &[Block], page_numbers: &PageNumberSequence, cutoff: u32) {
    let tokens: Vec<Option<String>> = blocks
        .iter()
        .map(|b| b.block_type.is_body().then(|| sorted_tokens(&b.text)))
        .collect();

    for entry in toc.iter_mut() {
        let wanted = sorted_tokens(&entry.text);

        let mut best: Option<TocMatch> = None;
        for (idx, t) in tokens.iter().enumerate() {
            let Some(t) = t else { continue };
            let score = ratio(&wanted, t);
            if best.map_or(true, |b| score > b.token_sort_ratio) {
                best = Some(TocMatch {
                    content_idx: idx,
                    token_sort_ratio: score,
                });
            }
        }

        if best.map_or(true, |b| b.token_sort_ratio < cutoff) {
            if let Some(page_id) = entry.page_value().and_then(|v| page_numbers.page_for_value(v)) {
                let mut page_best = 0;
                for (idx, t) in tokens.iter().enumerate() {
                    let Some(t) = t else { continue };
                    if blocks[idx].page_id != page_id {
                        continue;
                    }
                    let score = ratio(&wanted, t);
                    if score > page_best {
                        page_best = score;
                        best = Some(TocMatch {
                            content_idx: idx,
                            token_sort_ratio: score,
                        });
                    }
                }
            }
        }

        entry.toc_match = best;
    }

    let matched = toc.iter().filter(|e| e.toc_match.is_some()).count();
    log::debug!("matched {} of {} toc entries", matched, toc.len());
}
