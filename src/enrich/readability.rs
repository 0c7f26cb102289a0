// src/enrich/readability.rs
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::text::unescape_newlines;
use super::Enricher;
use crate::corpus::{types::DEFAULT_READABILITY, SongRecord};

/// Scores below this many words are not meaningful.
pub const DEFAULT_MIN_WORDS: usize = 100;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence terminator regex should be valid"));

/// Letter, word and sentence counts for a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    pub letters: usize,
    pub words: usize,
    pub sentences: usize,
}

impl TextStats {
    /// A word is a whitespace token with at least one alphanumeric char; only
    /// alphanumerics count as letters. A sentence is a run of text ending in
    /// `.`, `!` or `?` (or the end of input) that contains a word.
    pub fn of(text: &str) -> Self {
        let mut stats = TextStats::default();
        for token in text.split_whitespace() {
            let letters = token.chars().filter(|c| c.is_alphanumeric()).count();
            if letters > 0 {
                stats.words += 1;
                stats.letters += letters;
            }
        }
        stats.sentences = SENTENCE_END
            .split(text)
            .filter(|s| s.chars().any(char::is_alphanumeric))
            .count();
        stats
    }
}

/// Coleman–Liau index, or `None` when the text has fewer than `min_words` words.
pub fn coleman_liau(text: &str, min_words: usize) -> Option<f64> {
    let stats = TextStats::of(&unescape_newlines(text));
    if stats.words == 0 || stats.words < min_words {
        trace!(words = stats.words, min_words, "too short to score");
        return None;
    }
    let words = stats.words as f64;
    let l = stats.letters as f64 / words * 100.0;
    let s = stats.sentences.max(1) as f64 / words * 100.0;
    Some(0.0588 * l - 0.296 * s - 15.8)
}

/// Floored Coleman–Liau grade, never below 1.
pub fn grade_level(text: &str, min_words: usize) -> u32 {
    match coleman_liau(text, min_words) {
        Some(score) if score >= 1.0 => score.floor().min(u32::MAX as f64) as u32,
        _ => DEFAULT_READABILITY,
    }
}

/// Fills [`SongRecord::readability_grade`].
#[derive(Debug, Clone, Copy)]
pub struct ReadabilityEnricher {
    min_words: usize,
}

impl ReadabilityEnricher {
    pub fn new(min_words: usize) -> Self {
        Self { min_words }
    }
}

impl Default for ReadabilityEnricher {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORDS)
    }
}

impl Enricher for ReadabilityEnricher {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn enrich(&self, mut record: SongRecord) -> SongRecord {
        record.readability_grade = if record.has_lyrics {
            grade_level(&record.lyrics, self.min_words)
        } else {
            DEFAULT_READABILITY
        };
        record
    }
}
