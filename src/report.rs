// src/report.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument};
use unicode_segmentation::UnicodeSegmentation;

use crate::aggregate::{AggregateRow, AggregateTable, GroupKey, Metric, Selection};
use crate::config::AnalysisConfig;
use crate::corpus::{AlbumRecord, Corpus, ScrapeProgress, SongRecord};
use crate::enrich::text::unescape_newlines;
use crate::lexicon::WordList;

pub const OTHER_LANGUAGES: &str = "Other Languages";

/// A labelled count with its share of the total, in percent (one decimal).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub swear_ratio: f64,
    pub simple_songs_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub artists: usize,
    pub albums: usize,
    pub songs: usize,
    pub songs_with_lyrics: usize,
    pub progress: Vec<ScrapeProgress>,
}

/// Swear/readability figures over the most prolific artists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularArtistMetrics {
    pub language: String,
    pub songs: usize,
    pub artists: Vec<AggregateRow>,
    pub years: Vec<AggregateRow>,
    pub simple_song_curve: Vec<CurvePoint>,
}

/// Everything the presentation layer draws from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub corpus: CorpusSummary,
    pub lyrics_status: Vec<Share>,
    pub album_types: Vec<Share>,
    pub top_artists_by_songs: Vec<AggregateRow>,
    pub top_artists_by_albums: Vec<AggregateRow>,
    pub songs_per_year: Vec<AggregateRow>,
    pub language_distribution: Vec<Share>,
    pub language_table: Vec<Share>,
    pub popular_artists: PopularArtistMetrics,
    pub word_frequencies: Vec<WordCount>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Count labels, largest first; equal counts keep first-seen order.
pub fn count_labels<I, S>(labels: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        match slots.get(label) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                slots.insert(label.to_string(), counts.len());
                counts.push((label.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Attach percentages of the total of `counts`.
pub fn shares(counts: Vec<(String, usize)>) -> Vec<Share> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    counts
        .into_iter()
        .map(|(label, count)| Share {
            percent: if total == 0 {
                0.0
            } else {
                round_to(count as f64 / total as f64 * 100.0, 1)
            },
            label,
            count,
        })
        .collect()
}

pub fn lyrics_status(records: &[SongRecord]) -> Vec<Share> {
    shares(count_labels(records.iter().map(SongRecord::lyrics_status)))
}

pub fn album_types(albums: &[AlbumRecord]) -> Vec<Share> {
    shares(count_labels(albums.iter().map(|a| a.album_type.as_str())))
}

pub fn top_artists_by_songs(records: &[SongRecord], n: usize) -> Vec<AggregateRow> {
    AggregateTable::build(records, GroupKey::Artist, &Selection::all(), &[]).top_by_count(n)
}

pub fn top_artists_by_albums(records: &[SongRecord], n: usize) -> Vec<AggregateRow> {
    AggregateTable::distinct_count(records, GroupKey::Artist, &Selection::all(), |r| {
        r.album.as_str()
    })
    .top_by_count(n)
}

/// Songs per known release year, oldest first.
pub fn songs_per_year(records: &[SongRecord]) -> Vec<AggregateRow> {
    AggregateTable::build(records, GroupKey::ReleaseYear, &Selection::all(), &[]).sorted_by_key()
}

fn language_counts(records: &[SongRecord]) -> Vec<(String, usize)> {
    count_labels(
        records
            .iter()
            .filter(|r| r.has_lyrics)
            .map(|r| r.language.as_str()),
    )
}

/// Top `top` languages among songs with lyrics, the rest folded into
/// "Other Languages" when non-empty.
pub fn language_distribution(records: &[SongRecord], top: usize) -> Vec<Share> {
    let mut counts = language_counts(records);
    let other: usize = counts.iter().skip(top).map(|(_, c)| c).sum();
    counts.truncate(top);
    if other > 0 {
        counts.push((OTHER_LANGUAGES.to_string(), other));
    }
    shares(counts)
}

/// Top `n` languages with their share of those `n`.
pub fn language_table(records: &[SongRecord], n: usize) -> Vec<Share> {
    let mut counts = language_counts(records);
    counts.truncate(n);
    shares(counts)
}

/// Percent of songs at or above each swear-ratio threshold whose grade is at
/// most `max_grade`. Empty buckets score 0.
pub fn simple_song_curve(songs: &[&SongRecord], thresholds: &[f64], max_grade: u32) -> Vec<CurvePoint> {
    thresholds
        .iter()
        .map(|&threshold| {
            let above: Vec<&&SongRecord> = songs.iter().filter(|r| r.swear_ratio >= threshold).collect();
            let percent = if above.is_empty() {
                0.0
            } else {
                let simple = above
                    .iter()
                    .filter(|r| r.readability_grade <= max_grade)
                    .count();
                round_to(100.0 * simple as f64 / above.len() as f64, 2)
            };
            CurvePoint {
                swear_ratio: threshold,
                simple_songs_percent: percent,
            }
        })
        .collect()
}

/// Restrict to songs with lyrics in `language` and a known year, keep the
/// `top_bands` artists with the most such songs, and average swear ratio and
/// readability per artist and per year.
#[instrument(level = "info", skip(records, config))]
pub fn popular_artist_metrics(
    records: &[SongRecord],
    language: &str,
    config: &AnalysisConfig,
) -> PopularArtistMetrics {
    let base = Selection::all().with_lyrics().language(language).known_year();
    let bands: Vec<String> = AggregateTable::build(records, GroupKey::Artist, &base, &[])
        .top_by_count(config.top_bands)
        .into_iter()
        .map(|row| row.key.to_string())
        .collect();
    let selection = base.artists(bands);

    let metrics = [Metric::SwearRatio, Metric::ReadabilityGrade];
    let artists = AggregateTable::build(records, GroupKey::Artist, &selection, &metrics).rows;
    let years = AggregateTable::build(records, GroupKey::ReleaseYear, &selection, &metrics).sorted_by_key();

    let subset: Vec<&SongRecord> = records.iter().filter(|r| selection.matches(r)).collect();
    let curve = simple_song_curve(&subset, &config.ratio_thresholds(), config.simple_grade_max);
    info!(songs = subset.len(), artists = artists.len(), "popular artist metrics");

    PopularArtistMetrics {
        language: language.to_string(),
        songs: subset.len(),
        artists,
        years,
        simple_song_curve: curve,
    }
}

/// Most frequent words in lyrics, stopwords removed. Ties keep first-seen order.
pub fn word_frequencies(
    records: &[SongRecord],
    stopwords: &WordList,
    n: usize,
    artist: Option<&str>,
) -> Vec<WordCount> {
    let texts: Vec<String> = records
        .iter()
        .filter(|r| r.has_lyrics && artist.map_or(true, |a| r.artist == a))
        .map(|r| unescape_newlines(&r.lyrics.to_lowercase()))
        .collect();
    let words = texts
        .iter()
        .flat_map(|t| t.unicode_words())
        .filter(|w| !stopwords.contains(w));

    let mut counts = count_labels(words);
    counts.truncate(n);
    counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect()
}

/// Assemble every report from enriched records.
#[instrument(level = "info", skip_all, fields(songs = records.len()))]
pub fn build_report(
    corpus: &Corpus,
    records: &[SongRecord],
    stopwords: &WordList,
    config: &AnalysisConfig,
) -> Report {
    Report {
        generated_at: Utc::now(),
        corpus: CorpusSummary {
            artists: corpus.artists().len(),
            albums: corpus.albums.len(),
            songs: records.len(),
            songs_with_lyrics: records.iter().filter(|r| r.has_lyrics).count(),
            progress: corpus.progress.clone(),
        },
        lyrics_status: lyrics_status(records),
        album_types: album_types(&corpus.albums),
        top_artists_by_songs: top_artists_by_songs(records, config.top_n),
        top_artists_by_albums: top_artists_by_albums(records, config.top_n),
        songs_per_year: songs_per_year(records),
        language_distribution: language_distribution(records, config.top_languages),
        language_table: language_table(records, config.language_table_size),
        popular_artists: popular_artist_metrics(records, &config.target_language, config),
        word_frequencies: word_frequencies(
            records,
            stopwords,
            config.word_frequency_top,
            config.word_frequency_artist.as_deref(),
        ),
    }
}
