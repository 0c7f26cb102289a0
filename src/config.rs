// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Every knob of an analysis run. Missing YAML keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Corpus files or glob patterns, loaded in order.
    pub corpus: Vec<String>,
    pub swear_words: PathBuf,
    pub stopwords: PathBuf,

    /// Language the swear/readability reports are restricted to.
    pub target_language: String,
    /// Detections below this confidence resolve to "none".
    pub min_language_confidence: f64,
    pub readability_min_words: usize,
    /// Enrich on the rayon pool.
    pub parallel: bool,

    pub top_n: usize,
    pub top_languages: usize,
    pub language_table_size: usize,
    pub top_bands: usize,
    /// Highest readability grade that still counts as a "simple" song.
    pub simple_grade_max: u32,
    pub ratio_step: f64,
    pub ratio_max: f64,
    pub word_frequency_top: usize,
    pub word_frequency_artist: Option<String>,

    /// Parquet file with enriched records, reused when present.
    pub cache: Option<PathBuf>,
    pub export_parquet: Option<PathBuf>,
    /// JSON report destination; stdout when unset.
    pub output: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            corpus: vec!["data/progress1.json".to_string()],
            swear_words: PathBuf::from("resources/swear_words_eng.txt"),
            stopwords: PathBuf::from("resources/stopwords_eng.txt"),
            target_language: "English".to_string(),
            min_language_confidence: 0.0,
            readability_min_words: crate::enrich::readability::DEFAULT_MIN_WORDS,
            parallel: true,
            top_n: 10,
            top_languages: 4,
            language_table_size: 20,
            top_bands: 1000,
            simple_grade_max: 3,
            ratio_step: 0.01,
            ratio_max: 0.25,
            word_frequency_top: 20,
            word_frequency_artist: None,
            cache: None,
            export_parquet: None,
            output: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing analysis config")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Swear-ratio thresholds from 0 to `ratio_max` inclusive, `ratio_step` apart.
    pub fn ratio_thresholds(&self) -> Vec<f64> {
        if self.ratio_step <= 0.0 || self.ratio_max < 0.0 {
            return vec![0.0];
        }
        let steps = (self.ratio_max / self.ratio_step + 1e-9).floor() as usize;
        (0..=steps)
            .map(|i| (i as f64 * self.ratio_step * 1e6).round() / 1e6)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let cfg = AnalysisConfig::from_yaml_str(
            "corpus:\n  - data/progress*.json\ntop_bands: 50\nparallel: false\n",
        )?;
        assert_eq!(cfg.corpus, vec!["data/progress*.json".to_string()]);
        assert_eq!(cfg.top_bands, 50);
        assert!(!cfg.parallel);
        assert_eq!(cfg.target_language, "English");
        assert_eq!(cfg.simple_grade_max, 3);
        Ok(())
    }

    #[test]
    fn rejects_bad_types() {
        assert!(AnalysisConfig::from_yaml_str("top_bands: lots").is_err());
    }

    #[test]
    fn thresholds() {
        let t = AnalysisConfig::default().ratio_thresholds();
        assert_eq!(t.len(), 26);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[7], 0.07);
        assert_eq!(t[25], 0.25);
    }
}
