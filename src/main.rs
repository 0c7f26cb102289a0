use anyhow::{Context, Result};
use clap::Parser;
use lyricscan::{config::AnalysisConfig, pipeline};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Enrich a scraped lyrics corpus and print the analysis report as JSON.
#[derive(Parser, Debug)]
struct Args {
    /// YAML config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Corpus file or glob, repeatable
    #[arg(long)]
    corpus: Vec<String>,

    /// Swear word list
    #[arg(long)]
    swears: Option<PathBuf>,

    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Language for the swear/readability reports
    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    top_bands: Option<usize>,

    /// Parquet cache of enriched records
    #[arg(long)]
    cache: Option<PathBuf>,

    #[arg(long)]
    export_parquet: Option<PathBuf>,

    /// Report destination; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Enrich on the current thread only
    #[arg(long)]
    sequential: bool,
}

impl Args {
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_yaml_file(path)?,
            None => AnalysisConfig::default(),
        };
        if !self.corpus.is_empty() {
            config.corpus = self.corpus;
        }
        if let Some(p) = self.swears {
            config.swear_words = p;
        }
        if let Some(p) = self.stopwords {
            config.stopwords = p;
        }
        if let Some(l) = self.language {
            config.target_language = l;
        }
        if let Some(n) = self.top_bands {
            config.top_bands = n;
        }
        if self.cache.is_some() {
            config.cache = self.cache;
        }
        if self.export_parquet.is_some() {
            config.export_parquet = self.export_parquet;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if self.sequential {
            config.parallel = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Args::parse().into_config()?;
    info!(corpus = ?config.corpus, language = %config.target_language, "startup");

    let analysis = pipeline::run(&config)?;
    let json = serde_json::to_string_pretty(&analysis.report).context("serializing report")?;

    match &config.output {
        Some(path) => {
            write_report(path, &json)?;
            info!("report → {}", path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create `{}`", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("writing report {}", path.display()))
}
