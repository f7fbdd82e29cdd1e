//! Small text helpers shared by the structural stages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strict roman numeral, upper case.
static ROMAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$")
        .expect("valid roman regex")
});

/// Numbered section prefix such as `"3. "` or `"4.1. "`.
static SECTION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+\.)+\s+").expect("valid section regex"));

/// A long run of dots.
static DOT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{4,}").expect("valid dot run regex"));

/// Three dots closing a line on a word that may be a page number.
static DOT_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{3}\s*([0-9]+|[A-Za-z]+)\s*$").expect("valid dot tail regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Value of a roman numeral, case-insensitive. Empty input is not a numeral.
pub fn parse_roman(text: &str) -> Option<u32> {
    let upper = text.trim().to_ascii_uppercase();
    if upper.is_empty() || !ROMAN.is_match(&upper) {
        return None;
    }

    let digit = |c: char| match c {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => 0,
    };

    let values: Vec<u32> = upper.chars().map(digit).collect();
    let mut total = 0;
    for (i, &v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if next > v => total -= v as i64,
            _ => total += v as i64,
        }
    }
    u32::try_from(total).ok()
}

/// Whether the whole text is a roman numeral.
pub fn is_roman(text: &str) -> bool {
    parse_roman(text).is_some()
}

/// Value of a plain ASCII-digit string.
pub fn parse_arabic(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Whether the text is non-empty and made of ASCII digits only.
pub fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Replace control characters with spaces and trim.
pub fn clean(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Whether the text starts with a numbered section prefix.
pub fn starts_with_section_number(text: &str) -> bool {
    SECTION_PREFIX.is_match(text)
}

/// Whether some line of the text reads as a TOC row with a dot leader.
/// An ellipsis inside running text does not count.
pub fn has_dot_leader(text: &str) -> bool {
    text.lines().any(|line| {
        DOT_RUN.is_match(line)
            || DOT_TAIL
                .captures(line)
                .is_some_and(|c| is_digits(&c[1]) || is_roman(&c[1]))
    })
}

/// Whether `prev` ends a line with a hyphen that splits a word continued by `next`.
pub fn is_split_word(prev: &str, next: &str) -> bool {
    match prev.strip_suffix('-') {
        Some(stem) => !stem.trim().is_empty() && !next.trim().is_empty(),
        None => false,
    }
}

/// Whether the text contains an ASCII digit.
pub fn has_digit(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roman() {
        assert_eq!(parse_roman("iv"), Some(4));
        assert_eq!(parse_roman("XII"), Some(12));
        assert_eq!(parse_roman("MCMXC"), Some(1990));
        assert_eq!(parse_roman("IIII"), None);
        assert_eq!(parse_roman(""), None);
        assert_eq!(parse_roman("Intro"), None);
        assert!(is_roman(" xv "));
    }

    #[test]
    fn test_parse_arabic() {
        assert_eq!(parse_arabic(" 42 "), Some(42));
        assert_eq!(parse_arabic("4a"), None);
        assert_eq!(parse_arabic("-3"), None);
        assert!(is_digits("007"));
        assert!(!is_digits(""));
    }

    #[test]
    fn test_clean_and_normalize() {
        assert_eq!(clean("\u{0007}abc\tdef\n"), "abc def");
        assert_eq!(normalize_whitespace("  a \n  b\tc "), "a b c");
    }

    #[test]
    fn test_section_prefix() {
        assert!(starts_with_section_number("4.1. Scope"));
        assert!(starts_with_section_number("3. Results"));
        assert!(!starts_with_section_number("3 Results"));
        assert!(!starts_with_section_number("4.1Scope"));
    }

    #[test]
    fn test_dot_leader() {
        assert!(has_dot_leader("1 Introduction ........ 3"));
        assert!(has_dot_leader("Introduction ....... "));
        assert!(has_dot_leader("Foreword ... iii"));
        assert!(has_dot_leader("Scope...12"));
        assert!(!has_dot_leader("to municipal water services... as agreed in 2019"));
        assert!(!has_dot_leader("Ellipsis... in a later chapter"));
        assert!(!has_dot_leader("and so on..."));
        assert!(!has_dot_leader("military and... civil"));
    }

    #[test]
    fn test_split_word() {
        assert!(is_split_word("the intro-", "duction"));
        assert!(!is_split_word("-", "2"));
        assert!(!is_split_word("intro- ", "duction"));
        assert!(!is_split_word("intro", "duction"));
        assert!(has_digit("Section 4"));
        assert!(!has_digit("Section four"));
    }
}
