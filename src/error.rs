// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Structural problems with a corpus file. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum CorpusFormatError {
    /// A required key is missing, e.g. the top-level `dataset` object.
    #[error("missing key `{key}` in {path}")]
    MissingKey { path: PathBuf, key: String },

    /// The file could not be read.
    #[error("reading corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("parsing corpus {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An artist or album entry has the wrong shape.
    #[error("malformed entry `{entry}` in {path}: {detail}")]
    Malformed {
        path: PathBuf,
        entry: String,
        detail: String,
    },
}

/// Invalid arguments to [`crate::partition::partition_range`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PartitionError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("worker index {index} out of range for {count} workers")]
    IndexOutOfRange { index: usize, count: usize },
}
