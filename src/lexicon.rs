// src/lexicon.rs
use anyhow::{Context, Result};
use std::{collections::HashSet, fs, io, path::Path};
use tracing::{info, warn};

/// A lowercase word list read from a plain-text resource (one word per line).
///
/// Built once by the caller and handed to whatever needs it; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<String>,
    index: HashSet<String>,
}

impl WordList {
    /// Read a word list. A missing file is not an error: it yields an empty
    /// list and a warning.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => {
                let list = Self::from_lines(&String::from_utf8_lossy(&bytes));
                info!(path = %path.display(), words = list.len(), "loaded word list");
                Ok(list)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "word list not found; using an empty list");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("reading word list {}", path.display())),
        }
    }

    /// Parse file contents: entries are trimmed and lowercased, blank lines and
    /// `#` comments are skipped, duplicates keep their first position.
    pub fn from_lines(text: &str) -> Self {
        Self::from_words(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for w in words {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() && list.index.insert(w.clone()) {
                list.words.push(w);
            }
        }
        list
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
