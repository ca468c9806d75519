//! Reading-order text reconstruction from positioned glyphs.
//!
//! Glyphs arrive in content stream order. A change of baseline starts a new
//! line, a horizontal gap larger than [`WORD_GAP_TOLERANCE`] starts a new
//! word, and a lone `-` is held back so that a word hyphenated across a line
//! break is joined again.

use crate::content::Glyph;
use lazy_static::lazy_static;
use regex::Regex;

/// Horizontal distance (in page units) under which two glyphs belong to the
/// same word.
///
/// Tables whose cells sit closer than this run together.
pub const WORD_GAP_TOLERANCE: f64 = 1.1;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"[ \t\r\n\x0C]+").unwrap();
}

/// Running text of a document, extended one page at a time.
///
/// ```
/// use pdftext::content::Glyph;
/// use pdftext::layout::TextAccumulator;
///
/// let glyph = |text: &str, x: f64, y: f64| Glyph {
///     font: "Helvetica".to_string(),
///     font_size: 10.0,
///     x,
///     y,
///     width: 20.0,
///     text: text.to_string(),
/// };
///
/// let mut acc = TextAccumulator::new();
/// acc.add_page(&[glyph("Hello", 10.0, 700.0), glyph("World", 40.0, 700.0)]);
/// assert_eq!(acc.as_str(), "Hello World ");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextAccumulator {
    text: String,
    pages: usize,
}

impl TextAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the reconstructed text of one page.
    pub fn add_page(&mut self, glyphs: &[Glyph]) {
        let mut line = LineState::default();
        for glyph in glyphs {
            line.push(glyph, &mut self.text);
        }
        line.finish(&mut self.text);
        self.pages += 1;
        log::trace!("Page {} reconstructed, {} bytes so far", self.pages, self.text.len());
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Accumulated text with every whitespace run collapsed to one space.
    pub fn collapsed(&self) -> String {
        collapse_whitespace(&self.text)
    }

    /// Consume the accumulator, returning the text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Replace each run of space, tab, CR, LF or FF with a single space.
///
/// ```
/// use pdftext::layout::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("a \t\n b\x0C"), "a b ");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Per-page position tracking.
#[derive(Debug, Default)]
struct LineState {
    last_line_y: Option<f64>,
    last_word_end: Option<f64>,
    pending_separator: Option<String>,
    prev_ends_with_hyphen: bool,
}

impl LineState {
    fn push(&mut self, glyph: &Glyph, out: &mut String) {
        let mut is_new_line = self.last_line_y.is_some_and(|y| y != glyph.y);
        let is_new_word = !is_new_line
            && self
                .last_word_end
                .is_some_and(|end| (glyph.x - end).abs() > WORD_GAP_TOLERANCE);

        if let Some(separator) = self.pending_separator.take() {
            if is_new_line {
                is_new_line = false;
            } else {
                out.push_str(&separator);
            }
        }

        if glyph.text == "-" {
            self.pending_separator = Some(glyph.text.clone());
            return;
        }

        if is_new_word || (is_new_line && !self.prev_ends_with_hyphen) {
            out.push(' ');
        }
        self.last_word_end = Some(glyph.x + glyph.width);
        self.last_line_y = Some(glyph.y);
        out.push_str(&glyph.text);
        self.prev_ends_with_hyphen = glyph.text.ends_with('-');
    }

    // A separator still pending at the end of the page is dropped.
    fn finish(self, out: &mut String) {
        if self.pending_separator.is_none() && !self.prev_ends_with_hyphen {
            out.push(' ');
        }
    }
}
