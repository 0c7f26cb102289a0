// src/enrich/mod.rs
pub mod language;
pub mod readability;
pub mod swear;
pub mod text;

pub use language::{detect_language, language_name, LanguageEnricher};
pub use readability::{grade_level, ReadabilityEnricher};
pub use swear::{SwearLexicon, SwearRatioEnricher};

use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, instrument};

use crate::corpus::SongRecord;

/// A per-song derived field.
///
/// Implementations look at one record only and must be idempotent: feeding
/// the output back in gives the same record. Songs without lyrics keep the
/// field's sentinel value; detection or scoring failures also resolve to the
/// sentinel instead of an error.
pub trait Enricher: Send + Sync {
    fn name(&self) -> &'static str;
    fn enrich(&self, record: SongRecord) -> SongRecord;
}

/// Run every enricher over every record, keeping input order.
#[instrument(level = "info", skip(records, enrichers), fields(records = records.len()))]
pub fn enrich_all(
    records: Vec<SongRecord>,
    enrichers: &[&dyn Enricher],
    parallel: bool,
) -> Vec<SongRecord> {
    let start = Instant::now();
    let names: Vec<&str> = enrichers.iter().map(|e| e.name()).collect();
    info!(enrichers = ?names, parallel, "enriching records");

    let apply = |record: SongRecord| {
        enrichers
            .iter()
            .fold(record, |record, enricher| enricher.enrich(record))
    };
    let out: Vec<SongRecord> = if parallel {
        records.into_par_iter().map(apply).collect()
    } else {
        records.into_iter().map(apply).collect()
    };

    info!("enriched {} records in {:?}", out.len(), start.elapsed());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ReleaseYear, NO_LANGUAGE};
    use crate::lexicon::WordList;

    fn sample() -> Vec<SongRecord> {
        let lyrics = [
            "Damn the night, damn the cold, I walk alone through the storm again.",
            "",
            "abc",
            "Hell is empty and all the devils are here, burning in the fire of hate.",
            "Nos vamos a la playa mañana por la tarde con todos nuestros amigos.",
        ];
        lyrics
            .iter()
            .enumerate()
            .map(|(i, l)| {
                SongRecord::new("A", "B", format!("song {i}"), ReleaseYear::Known(2000), l)
            })
            .collect()
    }

    #[test]
    fn parallel_matches_sequential_and_keeps_order() {
        let lexicon = SwearLexicon::new(&WordList::from_words(["damn", "hell"])).unwrap();
        let language = LanguageEnricher::default();
        let swear = SwearRatioEnricher::new(&lexicon);
        let readability = ReadabilityEnricher::new(1);
        let enrichers: [&dyn Enricher; 3] = [&language, &swear, &readability];

        let seq = enrich_all(sample(), &enrichers, false);
        let par = enrich_all(sample(), &enrichers, true);
        assert_eq!(seq, par);
        let titles: Vec<&str> = seq.iter().map(|r| r.song.as_str()).collect();
        assert_eq!(titles, vec!["song 0", "song 1", "song 2", "song 3", "song 4"]);
        assert!(seq[0].swear_ratio > 0.0);
    }

    #[test]
    fn order_of_enrichers_does_not_matter() {
        let lexicon = SwearLexicon::new(&WordList::from_words(["damn"])).unwrap();
        let language = LanguageEnricher::default();
        let swear = SwearRatioEnricher::new(&lexicon);
        let readability = ReadabilityEnricher::default();

        let forward = enrich_all(sample(), &[&language, &swear, &readability], false);
        let backward = enrich_all(sample(), &[&readability, &swear, &language], false);
        assert_eq!(forward, backward);
    }

    #[test]
    fn no_lyrics_means_sentinels() {
        let lexicon = SwearLexicon::new(&WordList::from_words(["damn"])).unwrap();
        let language = LanguageEnricher::default();
        let swear = SwearRatioEnricher::new(&lexicon);
        let readability = ReadabilityEnricher::new(1);
        let out = enrich_all(sample(), &[&language, &swear, &readability], true);
        for rec in out.iter().filter(|r| !r.has_lyrics) {
            assert_eq!(rec.language, NO_LANGUAGE);
            assert_eq!(rec.swear_ratio, 0.0);
            assert_eq!(rec.readability_grade, 1);
        }
        assert_eq!(out.iter().filter(|r| !r.has_lyrics).count(), 2);
    }

    #[test]
    fn enrichment_twice_is_stable() {
        let lexicon = SwearLexicon::new(&WordList::from_words(["damn"])).unwrap();
        let language = LanguageEnricher::default();
        let swear = SwearRatioEnricher::new(&lexicon);
        let readability = ReadabilityEnricher::new(1);
        let enrichers: [&dyn Enricher; 3] = [&language, &swear, &readability];
        let once = enrich_all(sample(), &enrichers, false);
        let twice = enrich_all(once.clone(), &enrichers, false);
        assert_eq!(once, twice);
    }
}
