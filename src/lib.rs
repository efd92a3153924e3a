#![forbid(unsafe_code)]
//! # Corpus Analysis
//!
//! Corpus-linguistics toolkit: iterative collocation discovery over a
//! plain-text corpus, frequency-dictionary construction, and lexicon-based
//! sentiment scoring.
//!
//! The collocation engine repeatedly scores adjacent word pairs by
//! pointwise mutual information, fuses the qualifying pairs into compound
//! tokens, and re-runs on the rewritten stream so that longer collocations
//! emerge across rounds. Three substitution strategies with different
//! speed/completeness trade-offs are available behind one contract.
//!
//! Results are exported into a folder named after the corpus file; see the
//! `corpus_analysis` binary for the command-line surface.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::warn;

pub mod export;
pub mod freq;
pub mod fuse;
pub mod pipeline;
pub mod prepare;
pub mod score;
pub mod sentiment;

pub use export::{ExportFormat, ExportSink, FsExport, csv_safe_cell};
pub use freq::{FreqKind, FrequencyEntry, FrequencyTable, log_most_frequent};
pub use fuse::{FuseStrategy, SEPARATOR, collocation_degree, fuse, is_eligible};
pub use pipeline::{PipelineConfig, RoundOutcome, RoundStats, RunSummary, run_rounds};
pub use prepare::{
    NormalizeOptions, TextRules, apply_stemming, load_stopwords, load_words, pre_process,
    remove_stopwords, tokenize,
};
pub use score::{BigramCandidate, score_bigrams};
pub use sentiment::{
    SentimentReport, TermScore, format_sentiment_export, load_corpus, load_lexicon, log_sentiment,
    score_sentiment,
};

/// Validated configuration for a collocation run. The interactive layer
/// (or a library caller) fills this in; the core never prompts.
#[derive(Debug, Clone)]
pub struct CollocationOptions {
    /// Stopword file; stopword removal runs only when this is set.
    pub stopwords: Option<PathBuf>,
    /// Apply the normalization pipeline before scoring.
    pub pre_process: bool,
    /// Reduce tokens to Snowball stems (language auto-detected).
    pub apply_stemming: bool,
    pub strategy: FuseStrategy,
    pub rounds: usize,
    pub min_pair_count: usize,
    pub top_n: usize,
    pub export_format: ExportFormat,
}

impl Default for CollocationOptions {
    fn default() -> Self {
        CollocationOptions {
            stopwords: None,
            pre_process: true,
            apply_stemming: false,
            strategy: FuseStrategy::Indexed,
            rounds: 10,
            min_pair_count: 2,
            top_n: 100,
            export_format: ExportFormat::Tsv,
        }
    }
}

/// Validated configuration for a standalone frequency-dictionary run.
#[derive(Debug, Clone)]
pub struct FrequencyOptions {
    pub stopwords: Option<PathBuf>,
    pub kind: FreqKind,
    pub top_n: usize,
    pub export_format: ExportFormat,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        FrequencyOptions {
            stopwords: None,
            kind: FreqKind::Relative,
            top_n: 20,
            export_format: ExportFormat::Tsv,
        }
    }
}

/// Validated configuration for a sentiment run.
#[derive(Debug, Clone, Default)]
pub struct SentimentOptions {
    /// Matched surface forms to ignore when counting term occurrences.
    pub excluded: Vec<String>,
}

/// Folder/file base name derived from the corpus path.
pub fn corpus_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("corpus")
        .to_string()
}

fn prepared_words(
    corpus: &Path,
    stopwords: Option<&Path>,
    normalize: bool,
    stem: bool,
    rules: &TextRules,
) -> Result<Vec<String>, String> {
    let mut words = load_words(corpus)?;
    if let Some(stopword_path) = stopwords {
        let stopwords = load_stopwords(stopword_path);
        words = remove_stopwords(words, &stopwords);
    }
    if normalize {
        words = pre_process(words, &NormalizeOptions::default(), rules);
    }
    if stem {
        words = apply_stemming(&words);
    }
    Ok(words)
}

/// Runs the full iterative collocation pipeline over a corpus file and
/// exports per-round dictionaries, token streams, and the cross-round
/// summary into a folder named after the corpus.
pub fn run_collocations(
    corpus: &Path,
    options: &CollocationOptions,
) -> Result<RunSummary, String> {
    let rules = TextRules::default();
    let words = prepared_words(
        corpus,
        options.stopwords.as_deref(),
        options.pre_process,
        options.apply_stemming,
        &rules,
    )?;

    let config = PipelineConfig {
        rounds: options.rounds,
        strategy: options.strategy,
        min_pair_count: options.min_pair_count,
        top_n: options.top_n,
        export_format: options.export_format,
    };
    let stem = corpus_stem(corpus);
    let mut sink = FsExport::new(".");
    let summary = run_rounds(words, &config, &rules, &stem, &mut sink)?;
    sink.write_summary(&stem, &summary.format_summary())?;
    Ok(summary)
}

/// Builds and exports a frequency dictionary over the (optionally
/// stopword-filtered) corpus.
pub fn run_frequencies(
    corpus: &Path,
    options: &FrequencyOptions,
) -> Result<FrequencyTable, String> {
    let mut words = load_words(corpus)?;
    if let Some(stopword_path) = &options.stopwords {
        let stopwords = load_stopwords(stopword_path);
        words = remove_stopwords(words, &stopwords);
    }

    let table = FrequencyTable::build(&words, options.kind);
    if table.is_empty() {
        warn!("Empty corpus, nothing to export");
        return Ok(table);
    }
    log_most_frequent(&table, options.top_n);

    let stem = corpus_stem(corpus);
    let mut sink = FsExport::new(".");
    sink.write_dictionary(&stem, &stem, &table, options.export_format)?;
    Ok(table)
}

/// Scores the corpus against a sentiment lexicon and exports the report.
pub fn run_sentiment(
    corpus: &Path,
    lexicon: &Path,
    options: &SentimentOptions,
) -> Result<SentimentReport, String> {
    let lexicon_entries = load_lexicon(lexicon)?;
    if lexicon_entries.is_empty() {
        warn!("Lexicon {} holds no usable terms", lexicon.display());
    }
    let text = load_corpus(corpus)?;
    let excluded: HashSet<String> = options.excluded.iter().cloned().collect();

    let stem = corpus_stem(corpus);
    let report = score_sentiment(&text, &stem, &lexicon_entries, &excluded);
    log_sentiment(&report);

    if !report.terms.is_empty() {
        let mut sink = FsExport::new(".");
        sink.write_text(
            &stem,
            &format!("{stem}_sentiment.csv"),
            &format_sentiment_export(&report),
        )?;
    }
    Ok(report)
}
