// src/corpus/mod.rs
pub mod types;

pub use types::{
    has_lyrics, normalize_album_type, AlbumRecord, ReleaseYear, ScrapeProgress, SongRecord,
    NO_LANGUAGE,
};

use anyhow::{Context, Result};
use glob::glob;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

use crate::error::CorpusFormatError;

#[derive(Debug, Deserialize)]
struct RawCorpus {
    dataset: Option<Map<String, Value>>,
    #[serde(default)]
    progress: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawArtist {
    #[serde(default)]
    albums: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawAlbum {
    #[serde(default)]
    release_year: ReleaseYear,
    #[serde(default)]
    album_type: Option<Value>,
    #[serde(default)]
    songs: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawSong {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    lyrics: Option<Value>,
    #[serde(default)]
    track_number: Option<Value>,
}

fn parse_track_number(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|t| u32::try_from(t).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A string field; `null`/absent is `None`, anything else is dropped with a warning.
fn text_field(value: Option<Value>, field: &str, entry: &str) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            warn!(entry = %entry, field, value = %other, "expected a string; ignoring");
            None
        }
    }
}

/// The flattened corpus: songs and albums in file order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub songs: Vec<SongRecord>,
    pub albums: Vec<AlbumRecord>,
    /// Scraper checkpoint blocks, one per source file that carried one.
    pub progress: Vec<ScrapeProgress>,
    artists: Vec<String>,
}

impl Corpus {
    /// Read and flatten a single corpus file.
    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusFormatError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CorpusFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_json_str(&text, path)?;
        info!(
            artists = corpus.artists.len(),
            albums = corpus.albums.len(),
            songs = corpus.songs.len(),
            "loaded corpus"
        );
        Ok(corpus)
    }

    /// Load several files and concatenate them in order. An artist that shows up
    /// in a later file is skipped.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self, CorpusFormatError> {
        let mut corpus = Corpus::default();
        for path in paths {
            corpus.merge(Corpus::load(path)?);
        }
        Ok(corpus)
    }

    /// Parse corpus JSON. `path` is only used in error messages.
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self, CorpusFormatError> {
        let raw: RawCorpus = serde_json::from_str(text).map_err(|source| CorpusFormatError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = raw.dataset.ok_or_else(|| CorpusFormatError::MissingKey {
            path: path.to_path_buf(),
            key: "dataset".to_string(),
        })?;

        let mut corpus = Corpus::default();
        if let Some(progress) = raw.progress {
            match serde_json::from_value::<ScrapeProgress>(progress) {
                Ok(p) => corpus.progress.push(p),
                Err(e) => warn!(error = %e, "ignoring unreadable progress block"),
            }
        }

        for (artist_name, artist_value) in dataset {
            let artist: RawArtist = serde_json::from_value(artist_value).map_err(|e| {
                CorpusFormatError::Malformed {
                    path: path.to_path_buf(),
                    entry: artist_name.clone(),
                    detail: e.to_string(),
                }
            })?;

            let albums = artist.albums.unwrap_or_else(|| {
                warn!(artist = %artist_name, "artist has no `albums`; treating as empty");
                Map::new()
            });

            for (album_name, album_value) in albums {
                let album: RawAlbum = serde_json::from_value(album_value).map_err(|e| {
                    CorpusFormatError::Malformed {
                        path: path.to_path_buf(),
                        entry: format!("{} / {}", artist_name, album_name),
                        detail: e.to_string(),
                    }
                })?;
                let entry = format!("{} / {}", artist_name, album_name);
                let album_type = normalize_album_type(
                    text_field(album.album_type, "album_type", &entry).as_deref(),
                );
                let songs = album.songs.unwrap_or_else(|| {
                    warn!(artist = %artist_name, album = %album_name, "album has no `songs`; treating as empty");
                    Vec::new()
                });

                corpus.albums.push(AlbumRecord {
                    artist: artist_name.clone(),
                    album: album_name.clone(),
                    release_year: album.release_year,
                    album_type: album_type.clone(),
                    song_count: songs.len(),
                });

                for song_value in songs {
                    let song: RawSong = match serde_json::from_value(song_value) {
                        Ok(song) => song,
                        Err(e) => {
                            warn!(entry = %entry, error = %e, "skipping unreadable song");
                            continue;
                        }
                    };
                    let lyrics = text_field(song.lyrics, "lyrics", &entry);
                    let mut record = SongRecord::new(
                        artist_name.as_str(),
                        album_name.as_str(),
                        text_field(song.title, "title", &entry).unwrap_or_default(),
                        album.release_year,
                        lyrics.as_deref().unwrap_or(""),
                    );
                    record.track_number = parse_track_number(song.track_number.as_ref());
                    record.album_type = album_type.clone();
                    corpus.songs.push(record);
                }
            }
            corpus.artists.push(artist_name);
        }

        debug!(songs = corpus.songs.len(), "flattened corpus");
        Ok(corpus)
    }

    /// Append `other`, dropping artists already present.
    pub fn merge(&mut self, other: Corpus) {
        let seen: HashSet<String> = self.artists.iter().cloned().collect();
        let duplicates: HashSet<String> = other
            .artists
            .iter()
            .filter(|a| seen.contains(*a))
            .cloned()
            .collect();
        for artist in &duplicates {
            warn!(artist = %artist, "artist already loaded from an earlier file; skipping");
        }

        self.artists
            .extend(other.artists.into_iter().filter(|a| !duplicates.contains(a)));
        self.albums
            .extend(other.albums.into_iter().filter(|a| !duplicates.contains(&a.artist)));
        self.songs
            .extend(other.songs.into_iter().filter(|s| !duplicates.contains(&s.artist)));
        self.progress.extend(other.progress);
    }

    /// Artist names in first-seen order.
    pub fn artists(&self) -> &[String] {
        &self.artists
    }
}

/// Expand corpus arguments. Entries with glob metacharacters are expanded
/// (sorted); plain paths are passed through untouched.
pub fn expand_corpus_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(|c| matches!(c, '*' | '?' | '[')) {
            paths.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched: Vec<PathBuf> = glob(pattern)
            .with_context(|| format!("invalid corpus pattern '{}'", pattern))?
            .filter_map(Result::ok)
            .collect();
        if matched.is_empty() {
            warn!(pattern = %pattern, "corpus pattern matched no files");
        }
        matched.sort();
        paths.extend(matched);
    }
    Ok(paths)
}
