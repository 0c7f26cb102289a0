// src/pipeline.rs
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::AnalysisConfig;
use crate::corpus::{expand_corpus_paths, Corpus, SongRecord};
use crate::enrich::{
    enrich_all, Enricher, LanguageEnricher, ReadabilityEnricher, SwearLexicon, SwearRatioEnricher,
};
use crate::lexicon::WordList;
use crate::report::{build_report, Report};
use crate::store;

/// Output of a full run: the corpus as loaded, its enriched songs and the report.
#[derive(Debug)]
pub struct Analysis {
    pub corpus: Corpus,
    pub records: Vec<SongRecord>,
    pub report: Report,
}

/// Enrich the corpus songs with language, swear ratio and readability.
pub fn enrich_corpus(corpus: &Corpus, swears: &WordList, config: &AnalysisConfig) -> Result<Vec<SongRecord>> {
    let lexicon = SwearLexicon::new(swears).context("compiling swear word patterns")?;
    if lexicon.is_empty() {
        warn!("swear word list is empty; every swear ratio will be 0");
    }
    let language = LanguageEnricher::new(config.min_language_confidence);
    let swear = SwearRatioEnricher::new(&lexicon);
    let readability = ReadabilityEnricher::new(config.readability_min_words);
    let enrichers: [&dyn Enricher; 3] = [&language, &swear, &readability];

    Ok(enrich_all(corpus.songs.clone(), &enrichers, config.parallel))
}

/// Cached records when the cache file exists and matches the corpus size,
/// otherwise freshly enriched ones (written back to the cache if configured).
fn cached_or_enriched(corpus: &Corpus, swears: &WordList, config: &AnalysisConfig) -> Result<Vec<SongRecord>> {
    if let Some(cache) = config.cache.as_ref().filter(|p| p.exists()) {
        let records = store::read_records(cache)?;
        if records.len() == corpus.songs.len() {
            info!(path = %cache.display(), "using cached records");
            return Ok(records);
        }
        warn!(
            path = %cache.display(),
            cached = records.len(),
            songs = corpus.songs.len(),
            "cache does not match the corpus; recomputing"
        );
    }

    let records = enrich_corpus(corpus, swears, config)?;
    if let Some(cache) = &config.cache {
        store::write_records(cache, &records)?;
    }
    Ok(records)
}

/// Load, enrich and report.
#[instrument(level = "info", skip(config))]
pub fn run(config: &AnalysisConfig) -> Result<Analysis> {
    let start = Instant::now();

    let paths = expand_corpus_paths(&config.corpus)?;
    if paths.is_empty() {
        anyhow::bail!("no corpus files matched {:?}", config.corpus);
    }
    let corpus = Corpus::load_all(&paths)?;
    info!(
        files = paths.len(),
        artists = corpus.artists().len(),
        songs = corpus.songs.len(),
        "corpus ready"
    );

    let swears = WordList::load(&config.swear_words)?;
    let stopwords = WordList::load(&config.stopwords)?;

    let records = cached_or_enriched(&corpus, &swears, config)?;
    if let Some(export) = &config.export_parquet {
        store::write_records(export, &records)?;
    }

    let report = build_report(&corpus, &records, &stopwords, config);
    info!("analysis finished in {:?}", start.elapsed());
    Ok(Analysis {
        corpus,
        records,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregateTable, GroupKey, Selection};
    use crate::corpus::{ReleaseYear, NO_LANGUAGE};
    use crate::enrich::detect_language;
    use std::{fs, path::Path};
    use tempfile::tempdir;

    const CORPUS: &str = r#"{
        "dataset": {
            "A": {"albums": {"B": {
                "release_year": 2000,
                "album_type": "album",
                "songs": [
                    {"title": "X", "lyrics": "I love you love you love you"},
                    {"title": "Y", "lyrics": ""}
                ]
            }}}
        }
    }"#;

    fn config_in(dir: &Path) -> Result<AnalysisConfig> {
        let corpus = dir.join("progress1.json");
        fs::write(&corpus, CORPUS)?;
        let swears = dir.join("swears.txt");
        fs::write(&swears, "damn\nhell\n")?;

        Ok(AnalysisConfig {
            corpus: vec![corpus.display().to_string()],
            swear_words: swears,
            stopwords: dir.join("missing-stopwords.txt"),
            parallel: false,
            ..AnalysisConfig::default()
        })
    }

    #[test]
    fn small_corpus_end_to_end() -> Result<()> {
        let dir = tempdir()?;
        let analysis = run(&config_in(dir.path())?)?;
        let records = &analysis.records;
        assert_eq!(records.len(), 2);

        let x = &records[0];
        assert_eq!(x.song, "X");
        assert!(x.has_lyrics);
        assert_eq!(x.release_year, ReleaseYear::Known(2000));
        assert_eq!(x.swear_ratio, 0.0);
        assert_eq!(x.readability_grade, 1);
        // detection is deterministic: a detected name, or "none"
        let expected = detect_language(&x.lyrics, 0.0).unwrap_or_else(|| NO_LANGUAGE.to_string());
        assert_eq!(x.language, expected);
        assert!(!x.language.is_empty());
        let again = run(&config_in(dir.path())?)?;
        assert_eq!(again.records[0].language, x.language);

        let y = &records[1];
        assert!(!y.has_lyrics);
        assert_eq!(y.language, NO_LANGUAGE);
        assert_eq!(y.swear_ratio, 0.0);
        assert_eq!(y.readability_grade, 1);

        let by_artist = AggregateTable::build(records, GroupKey::Artist, &Selection::all(), &[]);
        assert_eq!(by_artist.len(), 1);
        assert_eq!(by_artist.get(&"A".into()).map(|r| r.count), Some(2));

        assert_eq!(analysis.report.corpus.songs, 2);
        assert_eq!(analysis.report.corpus.songs_with_lyrics, 1);
        Ok(())
    }

    #[test]
    fn cache_is_written_then_reused() -> Result<()> {
        let dir = tempdir()?;
        let mut config = config_in(dir.path())?;
        let cache = dir.path().join("cache").join("records.parquet");
        config.cache = Some(cache.clone());
        config.export_parquet = Some(dir.path().join("export.parquet"));

        let first = run(&config)?;
        assert!(cache.exists());
        assert!(dir.path().join("export.parquet").exists());

        // poison the swear list; a cache hit must not re-enrich
        fs::write(&config.swear_words, "love\n")?;
        let second = run(&config)?;
        assert_eq!(first.records, second.records);
        Ok(())
    }

    #[test]
    fn missing_dataset_aborts() -> Result<()> {
        let dir = tempdir()?;
        let config = config_in(dir.path())?;
        fs::write(&config.corpus[0], r#"{"progress": {}}"#)?;
        let err = run(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("dataset"));
        Ok(())
    }

    #[test]
    fn unmatched_glob_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let mut config = config_in(dir.path())?;
        config.corpus = vec![format!("{}/nothing*.json", dir.path().display())];
        assert!(run(&config).is_err());
        Ok(())
    }
}
