//! Parsing options and configuration.

use std::fmt;
use std::str::FromStr;

/// Options for parsing PDF documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Decimal places kept when bucketing font sizes (None = exact sizes)
    pub font_size_remainder: Option<u32>,

    /// Key fonts on (size, font name) instead of size alone
    pub granularity: bool,

    /// How strictly page-number candidates must share style
    pub page_number_style_match: StyleMatch,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Tuned heuristic constants
    pub thresholds: Thresholds,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Round font sizes to `places` decimals before classification.
    pub fn with_font_size_remainder(mut self, places: u32) -> Self {
        self.font_size_remainder = Some(places);
        self
    }

    /// Enable or disable per-font classification.
    pub fn with_granularity(mut self, granularity: bool) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set the page-number style policy.
    pub fn with_style_match(mut self, style: StyleMatch) -> Self {
        self.page_number_style_match = style;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip undecodable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Replace the heuristic thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Bucket a raw font size according to `font_size_remainder`.
    pub fn bucket_size(&self, size: f32) -> f32 {
        match self.font_size_remainder {
            Some(places) => {
                let scale = 10f32.powi(places.min(6) as i32);
                (size * scale).round() / scale
            }
            None => size,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            font_size_remainder: None,
            granularity: false,
            page_number_style_match: StyleMatch::Any,
            error_mode: ErrorMode::Strict,
            thresholds: Thresholds::default(),
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip undecodable pages and continue
    Lenient,
}

/// Style agreement required between consecutive page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMatch {
    /// Same font and size
    Exact,
    /// Same size and at least one shared `+`-separated font-name part
    Rough,
    /// Same size
    #[default]
    Any,
}

impl StyleMatch {
    /// Whether two (font, size) pairs agree under this policy.
    pub fn matches(&self, a_font: &str, a_size: f32, b_font: &str, b_size: f32) -> bool {
        if a_size != b_size {
            return false;
        }
        match self {
            StyleMatch::Exact => a_font == b_font,
            StyleMatch::Rough => a_font
                .split('+')
                .any(|part| b_font.split('+').any(|other| other == part)),
            StyleMatch::Any => true,
        }
    }
}

impl fmt::Display for StyleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StyleMatch::Exact => "exact",
            StyleMatch::Rough => "rough",
            StyleMatch::Any => "any",
        })
    }
}

impl FromStr for StyleMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(StyleMatch::Exact),
            "rough" => Ok(StyleMatch::Rough),
            "any" => Ok(StyleMatch::Any),
            other => Err(format!(
                "unknown style match '{}', expected exact, rough or any",
                other
            )),
        }
    }
}

/// Tuned constants of the structural heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Vertical gap, as a multiple of the previous size, that starts a paragraph
    pub paragraph_gap_factor: f32,
    /// Maximum |Δy0|+|Δy1| between consecutive page numbers on same-orientation pages
    pub page_number_error_budget: f32,
    /// Minimum pages in an accepted page-number run
    pub min_sequence_length: usize,
    /// Score below which the matcher retries on the referenced page
    pub similarity_cutoff: u32,
    /// Pages scanned for a dot-leader TOC
    pub toc_page_limit: usize,
    /// Candidates may exceed the page count by this much
    pub page_number_slack: u32,
    /// Candidates must be shorter than this many characters
    pub page_number_max_len: usize,
    /// Header prefix length after which a mismatch ends the header
    pub header_match_len: usize,
    /// Horizontal gap, as a multiple of the previous size, under which two
    /// spans on one line touch and join without a space
    pub word_gap_factor: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            paragraph_gap_factor: 0.85,
            page_number_error_budget: 200.0,
            min_sequence_length: 5,
            similarity_cutoff: 80,
            toc_page_limit: 20,
            page_number_slack: 50,
            page_number_max_len: 6,
            header_match_len: 10,
            word_gap_factor: 0.2,
        }
    }
}
