// src/corpus/types.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Language sentinel for songs without lyrics or without a confident detection.
pub const NO_LANGUAGE: &str = "none";
/// Readability sentinel for songs that could not be scored.
pub const DEFAULT_READABILITY: u32 = 1;
/// Trimmed lyrics shorter than this (in chars) count as "no lyrics".
pub const MIN_LYRICS_CHARS: usize = 5;

pub const WITH_LYRICS: &str = "With Lyrics";
pub const WITHOUT_LYRICS: &str = "Without Lyrics";
pub const UNKNOWN_ALBUM_TYPE: &str = "Unknown";

/// Album release year as scraped. Anything that isn't a number (or a numeric
/// string) is kept as `Unknown` and never folded into a real year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReleaseYear {
    Known(i32),
    #[default]
    Unknown,
}

impl ReleaseYear {
    /// Interpret a raw JSON `release_year` value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .or_else(|| n.as_f64().and_then(whole_year))
                .map_or(ReleaseYear::Unknown, ReleaseYear::Known),
            Value::String(s) => Self::parse(s),
            _ => ReleaseYear::Unknown,
        }
    }

    /// Parse a textual year: "1994", " 1994 ", "1994.0". Everything else is unknown.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        s.parse::<i32>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().and_then(whole_year))
            .map_or(ReleaseYear::Unknown, ReleaseYear::Known)
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            ReleaseYear::Known(y) => Some(*y),
            ReleaseYear::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ReleaseYear::Known(_))
    }
}

fn whole_year(f: f64) -> Option<i32> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseYear::Known(y) => write!(f, "{}", y),
            ReleaseYear::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for ReleaseYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReleaseYear::Known(y) => serializer.serialize_i32(*y),
            ReleaseYear::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for ReleaseYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ReleaseYear::from_json(&value))
    }
}

/// `true` when trimmed lyrics are non-empty and at least [`MIN_LYRICS_CHARS`] long.
pub fn has_lyrics(lyrics: &str) -> bool {
    let trimmed = lyrics.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= MIN_LYRICS_CHARS
}

/// Normalize the scraped album type: "demo"/"album" in any case become
/// "Demo"/"Album", missing or blank becomes "Unknown", the rest is kept.
pub fn normalize_album_type(raw: Option<&str>) -> String {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        UNKNOWN_ALBUM_TYPE.to_string()
    } else if raw.eq_ignore_ascii_case("demo") {
        "Demo".to_string()
    } else if raw.eq_ignore_ascii_case("album") {
        "Album".to_string()
    } else {
        raw.to_string()
    }
}

/// One flattened song. Created by the loader with sentinel feature values,
/// then filled in by the enrichers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    pub artist: String,
    pub album: String,
    pub song: String,
    pub track_number: Option<u32>,
    pub release_year: ReleaseYear,
    pub album_type: String,
    pub lyrics: String,
    pub has_lyrics: bool,
    pub language: String,
    pub swear_ratio: f64,
    pub readability_grade: u32,
}

impl SongRecord {
    /// Build a record with trimmed lyrics and every derived feature at its sentinel.
    pub fn new(
        artist: impl Into<String>,
        album: impl Into<String>,
        song: impl Into<String>,
        release_year: ReleaseYear,
        lyrics: &str,
    ) -> Self {
        let lyrics = lyrics.trim().to_string();
        Self {
            artist: artist.into(),
            album: album.into(),
            song: song.into(),
            track_number: None,
            release_year,
            album_type: UNKNOWN_ALBUM_TYPE.to_string(),
            has_lyrics: has_lyrics(&lyrics),
            lyrics,
            language: NO_LANGUAGE.to_string(),
            swear_ratio: 0.0,
            readability_grade: DEFAULT_READABILITY,
        }
    }

    pub fn lyrics_status(&self) -> &'static str {
        if self.has_lyrics {
            WITH_LYRICS
        } else {
            WITHOUT_LYRICS
        }
    }

    /// Put the three derived features back to their sentinels.
    pub fn reset_features(&mut self) {
        self.language = NO_LANGUAGE.to_string();
        self.swear_ratio = 0.0;
        self.readability_grade = DEFAULT_READABILITY;
    }
}

/// One album, kept alongside the songs for album-level reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumRecord {
    pub artist: String,
    pub album: String,
    pub release_year: ReleaseYear,
    pub album_type: String,
    pub song_count: usize,
}

/// Checkpoint block the scraper writes next to `dataset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeProgress {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub processed_artists: u64,
    #[serde(default)]
    pub total_albums: u64,
    #[serde(default)]
    pub total_songs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn release_year_forms() {
        assert_eq!(ReleaseYear::from_json(&json!(1994)), ReleaseYear::Known(1994));
        assert_eq!(ReleaseYear::from_json(&json!("1994")), ReleaseYear::Known(1994));
        assert_eq!(ReleaseYear::from_json(&json!(1994.0)), ReleaseYear::Known(1994));
        assert_eq!(ReleaseYear::from_json(&json!("")), ReleaseYear::Unknown);
        assert_eq!(ReleaseYear::from_json(&json!("Unknown")), ReleaseYear::Unknown);
        assert_eq!(ReleaseYear::from_json(&Value::Null), ReleaseYear::Unknown);
        assert_eq!(ReleaseYear::Unknown.to_string(), "unknown");
        assert_eq!(serde_json::to_value(ReleaseYear::Unknown).unwrap(), json!("unknown"));
        assert_eq!(serde_json::to_value(ReleaseYear::Known(0)).unwrap(), json!(0));
    }

    #[test]
    fn lyrics_gate() {
        assert!(!has_lyrics(""));
        assert!(!has_lyrics("   \n "));
        assert!(!has_lyrics(" abcd "));
        assert!(has_lyrics("abcde"));
        // counted in chars, not bytes
        assert!(!has_lyrics("éééé"));
    }

    #[test]
    fn new_record_uses_sentinels() {
        let rec = SongRecord::new("A", "B", "X", ReleaseYear::Known(2000), "  la la la  ");
        assert_eq!(rec.lyrics, "la la la");
        assert!(rec.has_lyrics);
        assert_eq!(rec.language, NO_LANGUAGE);
        assert_eq!(rec.swear_ratio, 0.0);
        assert_eq!(rec.readability_grade, DEFAULT_READABILITY);
        assert_eq!(rec.lyrics_status(), WITH_LYRICS);
    }

    #[test]
    fn album_type_normalization() {
        assert_eq!(normalize_album_type(Some("DEMO")), "Demo");
        assert_eq!(normalize_album_type(Some("album")), "Album");
        assert_eq!(normalize_album_type(Some("EP")), "EP");
        assert_eq!(normalize_album_type(Some("  ")), "Unknown");
        assert_eq!(normalize_album_type(None), "Unknown");
    }
}
