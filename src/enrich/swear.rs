// src/enrich/swear.rs
use anyhow::{Context, Result};
use regex::Regex;

use super::text::normalize_for_matching;
use super::Enricher;
use crate::corpus::SongRecord;
use crate::lexicon::WordList;

/// Whole-word matchers for a swear list, compiled once per run.
#[derive(Debug, Clone, Default)]
pub struct SwearLexicon {
    patterns: Vec<Regex>,
}

impl SwearLexicon {
    /// Entries are normalized like the lyrics they are matched against, so
    /// `son-of-a-bitch` matches as `son of a bitch`. Entries that normalize to
    /// nothing are skipped.
    pub fn new(words: &WordList) -> Result<Self> {
        let patterns = words
            .words()
            .iter()
            .filter_map(|w| {
                let normalized = normalize_for_matching(w)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                (!normalized.is_empty()).then_some((w, normalized))
            })
            .map(|(w, normalized)| {
                Regex::new(&format!(r"\b{}\b", regex::escape(&normalized).replace(' ', r"\s+")))
                    .with_context(|| format!("compiling matcher for '{}'", w))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Matches of every listed word divided by the token count of the normalized text.
    ///
    /// Each word is counted on its own, so overlapping entries (`"hell"` and
    /// `"hell no"`) both score and the ratio can go past 1.0.
    pub fn ratio(&self, text: &str) -> f64 {
        let normalized = normalize_for_matching(text);
        let tokens = normalized.split_whitespace().count();
        if tokens == 0 {
            return 0.0;
        }
        let hits: usize = self
            .patterns
            .iter()
            .map(|re| re.find_iter(&normalized).count())
            .sum();
        hits as f64 / tokens as f64
    }
}

/// Fills [`SongRecord::swear_ratio`].
#[derive(Debug, Clone, Copy)]
pub struct SwearRatioEnricher<'a> {
    lexicon: &'a SwearLexicon,
}

impl<'a> SwearRatioEnricher<'a> {
    pub fn new(lexicon: &'a SwearLexicon) -> Self {
        Self { lexicon }
    }
}

impl Enricher for SwearRatioEnricher<'_> {
    fn name(&self) -> &'static str {
        "swear_ratio"
    }

    fn enrich(&self, mut record: SongRecord) -> SongRecord {
        record.swear_ratio = if record.has_lyrics {
            self.lexicon.ratio(&record.lyrics)
        } else {
            0.0
        };
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::ReleaseYear;

    fn lexicon(words: &[&str]) -> SwearLexicon {
        SwearLexicon::new(&WordList::from_words(words)).unwrap()
    }

    #[test]
    fn counts_whole_words_case_insensitively() {
        let lex = lexicon(&["hell"]);
        assert!((lex.ratio("Hell yeah, hell no, heaven,") - 0.4).abs() < 1e-12);
        assert_eq!(lex.ratio("hello shellfish"), 0.0);
    }

    #[test]
    fn every_token_matching_is_one() {
        assert_eq!(lexicon(&["damn"]).ratio("damn damn damn"), 1.0);
    }

    #[test]
    fn overlapping_entries_can_exceed_one() {
        assert_eq!(lexicon(&["hell", "hell hell"]).ratio("hell hell"), 1.5);
    }

    #[test]
    fn escaped_newlines_split_words() {
        assert_eq!(lexicon(&["damn", "hell"]).ratio("Damn\\nhell"), 1.0);
    }

    #[test]
    fn punctuated_entries_match_normalized_lyrics() {
        let lex = lexicon(&["son-of-a-bitch", "f*ck", "!!!"]);
        assert_eq!(lex.patterns.len(), 2);
        // five tokens once the hyphens are blanked out
        assert!((lex.ratio("you son-of-a-bitch") - 0.2).abs() < 1e-12);
        assert!((lex.ratio("You son of a bitch") - 0.2).abs() < 1e-12);
        assert!((lex.ratio("you son, of a bitch") - 0.2).abs() < 1e-12);
        assert!((lex.ratio("f*ck it") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn shipped_list_entries_can_all_match() -> Result<()> {
        let list = WordList::load(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/swear_words_eng.txt"))?;
        assert!(list.contains("son-of-a-bitch"));
        let lex = SwearLexicon::new(&list)?;
        assert!(lex.ratio("you son-of-a-bitch") > 0.0);
        for word in list.words() {
            assert!(lex.ratio(word) > 0.0, "{word} never matches");
        }
        Ok(())
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(lexicon(&["damn"]).ratio(""), 0.0);
        assert_eq!(lexicon(&["damn"]).ratio(" ,,, !! "), 0.0);
        assert_eq!(SwearLexicon::default().ratio("damn it"), 0.0);
    }

    #[test]
    fn enricher_is_idempotent() {
        let lex = lexicon(&["damn"]);
        let enricher = SwearRatioEnricher::new(&lex);
        let rec = SongRecord::new("a", "b", "c", ReleaseYear::Unknown, "damn it all, damn");
        let once = enricher.enrich(rec);
        let twice = enricher.enrich(once.clone());
        assert_eq!(once.swear_ratio, 0.5);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_lyrics_keeps_sentinel() {
        let lex = lexicon(&["damn"]);
        let rec = SongRecord::new("a", "b", "c", ReleaseYear::Unknown, "damn");
        assert!(!rec.has_lyrics);
        assert_eq!(SwearRatioEnricher::new(&lex).enrich(rec).swear_ratio, 0.0);
    }
}
