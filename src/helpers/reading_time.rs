//! Reading time estimation
//!
//! Words are counted the same way for bodies and headings: split on single
//! spaces, no collapsing of repeated whitespace. `"a  b"` counts as three.

use crate::content::ContentBlock;

/// Default reading speed
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes needed to read a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

impl ReadingTime {
    /// Estimate at the default speed of 200 words per minute
    pub fn estimate(content: &[ContentBlock]) -> Self {
        Self::estimate_with(content, WORDS_PER_MINUTE)
    }

    pub fn estimate_with(content: &[ContentBlock], words_per_minute: usize) -> Self {
        let words = body_words(content) + heading_words(content);
        Self {
            words,
            minutes: words.div_ceil(words_per_minute.max(1)),
        }
    }
}

impl std::fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} min", self.minutes)
    }
}

/// Count words separated by single spaces; empty text has none
pub fn count_words(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.split(' ').count()
    }
}

/// Words of every body, flattened into one plain-text stream
pub fn body_words(content: &[ContentBlock]) -> usize {
    let text = content
        .iter()
        .flat_map(|block| block.body.iter())
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    count_words(&text)
}

/// Words of every non-empty heading
pub fn heading_words(content: &[ContentBlock]) -> usize {
    content
        .iter()
        .filter(|block| block.has_heading())
        .map(|block| count_words(&block.heading))
        .sum()
}
