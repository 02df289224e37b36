//! Word, character and paragraph statistics.
//!
//! # Responsibility
//! - Count words, characters and paragraphs of raw editor text.
//!
//! # Invariants
//! - Word count is unaffected by leading/trailing whitespace.
//! - `avg_words_per_paragraph` is `0.0` whenever `paragraphs == 0`.
//! - Character counts are UTF-16 code units, matching host text widgets.
//! - Only zero-length blocks are dropped when counting paragraphs; a block
//!   holding just spaces still counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph break regex"));

/// Statistics snapshot for one text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextStats {
    pub words: usize,
    pub chars: usize,
    pub chars_no_whitespace: usize,
    pub paragraphs: usize,
    pub avg_words_per_paragraph: f64,
}

impl TextStats {
    /// Analysis-panel style summary, e.g. `3 words, 14 chars (11), 2 paragraphs (avg 1.5 words)`.
    pub fn summary(&self) -> String {
        format!(
            "{} words, {} chars ({}), {} paragraphs (avg {:.1} words)",
            self.words,
            self.chars,
            self.chars_no_whitespace,
            self.paragraphs,
            self.avg_words_per_paragraph
        )
    }
}

/// Computes statistics for `text`.
pub fn stats(text: &str) -> TextStats {
    let words = word_count(text);
    let chars = utf16_len(text);
    let chars_no_whitespace = utf16_len(&WHITESPACE_RE.replace_all(text, ""));
    let paragraphs = PARAGRAPH_BREAK_RE
        .split(text)
        .filter(|block| !block.is_empty())
        .count();
    let avg_words_per_paragraph = if paragraphs == 0 {
        0.0
    } else {
        words as f64 / paragraphs as f64
    };

    TextStats {
        words,
        chars,
        chars_no_whitespace,
        paragraphs,
        avg_words_per_paragraph,
    }
}

/// Counts maximal non-whitespace runs.
pub fn word_count(text: &str) -> usize {
    WHITESPACE_RE
        .split(text)
        .filter(|token| !token.is_empty())
        .count()
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
