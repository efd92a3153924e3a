#![forbid(unsafe_code)]
//! # Corpus Analysis CLI
//!
//! This is the command-line interface for the `corpus_analysis` crate.
//! It drives the three analyses over plain-text corpora without writing
//! Rust code.
//!
//! ## Features
//! - Iterative collocation discovery with selectable fusion strategy.
//! - Frequency dictionaries with absolute or relative counts.
//! - Lexicon-based sentiment scoring.
//! - Export results as TSV, CSV, or JSON into a corpus-named folder.
//!
//! ## Example
//! ```bash
//! cargo run --release -- collocations corpus.txt --stopwords stopwords.txt --preprocess
//! ```
//!
//! See `--help` for all available options.

use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process;

use corpus_analysis::{
    CollocationOptions, ExportFormat, FreqKind, FrequencyOptions, FuseStrategy, SentimentOptions,
    run_collocations, run_frequencies, run_sentiment,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Iteratively discover collocations and fuse them into compound tokens
    Collocations {
        /// Corpus file to analyze (UTF-8 plain text)
        corpus: PathBuf,

        /// Optional stopword file (words removed before scoring)
        #[arg(long)]
        stopwords: Option<PathBuf>,

        /// Normalize the corpus first (lowercase, unicode punctuation,
        /// diacritics, punctuation, digits)
        #[arg(long, default_value_t = false)]
        preprocess: bool,

        /// Reduce tokens to their stems (language auto-detected)
        #[arg(long, default_value_t = false)]
        stem: bool,

        /// Substitution strategy used to rewrite the token stream
        #[arg(long, value_enum, default_value = "indexed")]
        strategy: FuseStrategy,

        /// Number of score-then-fuse rounds
        #[arg(long, default_value_t = 10)]
        rounds: usize,

        /// Minimum bigram co-occurrence count to qualify
        #[arg(long, default_value_t = 2)]
        min_pair_count: usize,

        /// How many entries to display per round
        #[arg(long, default_value_t = 100)]
        top: usize,

        /// Output format for dictionary exports (tsv, csv, json)
        #[arg(long, value_enum, default_value = "tsv")]
        export_format: ExportFormat,
    },

    /// Build a frequency dictionary over the corpus
    Frequencies {
        /// Corpus file to analyze (UTF-8 plain text)
        corpus: PathBuf,

        /// Optional stopword file (words removed before counting)
        #[arg(long)]
        stopwords: Option<PathBuf>,

        /// Report proportions of the total instead of absolute counts
        #[arg(long, default_value_t = false)]
        relative: bool,

        /// How many entries to display
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Output format for the dictionary export (tsv, csv, json)
        #[arg(long, value_enum, default_value = "tsv")]
        export_format: ExportFormat,
    },

    /// Score the corpus against a sentiment lexicon
    Sentiment {
        /// Corpus file to analyze (UTF-8 plain text)
        corpus: PathBuf,

        /// Lexicon file with `term;value` lines
        #[arg(long)]
        lexicon: PathBuf,

        /// Matched words to ignore when counting occurrences (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Collocations {
            corpus,
            stopwords,
            preprocess,
            stem,
            strategy,
            rounds,
            min_pair_count,
            top,
            export_format,
        } => {
            let options = CollocationOptions {
                stopwords,
                pre_process: preprocess,
                apply_stemming: stem,
                strategy,
                rounds,
                min_pair_count,
                top_n: top,
                export_format,
            };
            run_collocations(&corpus, &options).map(|summary| {
                println!("{}", summary.format_summary());
            })
        }
        Command::Frequencies {
            corpus,
            stopwords,
            relative,
            top,
            export_format,
        } => {
            let options = FrequencyOptions {
                stopwords,
                kind: if relative {
                    FreqKind::Relative
                } else {
                    FreqKind::Absolute
                },
                top_n: top,
                export_format,
            };
            run_frequencies(&corpus, &options).map(|table| {
                println!("{} entries in dictionary", table.len());
            })
        }
        Command::Sentiment {
            corpus,
            lexicon,
            exclude,
        } => {
            let options = SentimentOptions { excluded: exclude };
            run_sentiment(&corpus, &lexicon, &options).map(|report| {
                println!("Sentiment index = {:.15}", report.index);
            })
        }
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}
