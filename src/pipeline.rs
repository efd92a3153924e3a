use log::{info, warn};
use serde::Serialize;

use crate::export::{ExportFormat, ExportSink};
use crate::freq::{FreqKind, FrequencyTable, log_most_frequent};
use crate::fuse::{FuseStrategy, collocation_degree, fuse};
use crate::prepare::TextRules;
use crate::score::score_bigrams;

/// Collocation degrees tracked individually; anything above lands in the
/// catch-all bucket.
pub const DEGREE_BUCKETS: usize = 10;

/// Settings driving the round loop. Rounds always run to the configured
/// count; saturated no-op rounds are expected, not an error.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub rounds: usize,
    pub strategy: FuseStrategy,
    pub min_pair_count: usize,
    pub top_n: usize,
    pub export_format: ExportFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            rounds: 10,
            strategy: FuseStrategy::Indexed,
            min_pair_count: 2,
            top_n: 100,
            export_format: ExportFormat::Tsv,
        }
    }
}

/// Per-round census of compound tokens: how many tokens sit at each
/// collocation degree 1..=10, plus a bucket for deeper compounds.
/// Immutable once the round finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundStats {
    pub round: usize,
    pub degree_counts: [u64; DEGREE_BUCKETS],
    pub beyond: u64,
}

impl RoundStats {
    pub fn collect(round: usize, tokens: &[String]) -> RoundStats {
        let mut degree_counts = [0u64; DEGREE_BUCKETS];
        let mut beyond = 0u64;
        for token in tokens {
            match collocation_degree(token) {
                0 => {}
                d if d <= DEGREE_BUCKETS => degree_counts[d - 1] += 1,
                _ => beyond += 1,
            }
        }
        RoundStats {
            round,
            degree_counts,
            beyond,
        }
    }

    /// Total number of compound tokens seen this round.
    pub fn fused_total(&self) -> u64 {
        self.degree_counts.iter().sum::<u64>() + self.beyond
    }
}

/// What one round produced: the degree census and the compound-token
/// frequency table handed to the export sink.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub stats: RoundStats,
    pub table: FrequencyTable,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rounds: Vec<RoundOutcome>,
    pub final_tokens: Vec<String>,
}

impl RunSummary {
    /// Tab-separated cross-round matrix: one row per round, one column per
    /// degree bucket.
    pub fn format_summary(&self) -> String {
        let mut out = String::from("round");
        for degree in 1..=DEGREE_BUCKETS {
            out.push_str(&format!("\t{degree}"));
        }
        out.push_str("\t>10\n");
        for outcome in &self.rounds {
            out.push_str(&outcome.stats.round.to_string());
            for count in outcome.stats.degree_counts {
                out.push_str(&format!("\t{count}"));
            }
            out.push_str(&format!("\t{}\n", outcome.stats.beyond));
        }
        out
    }
}

/// Drives the score/fuse/report loop for the configured number of rounds.
///
/// Each round reads the previous round's sequence immutably, installs the
/// rewritten sequence wholesale, builds the compound-token frequency table,
/// logs the most frequent entries, and persists the dictionary and the
/// full token stream through the sink. There is no early termination.
pub fn run_rounds(
    mut words: Vec<String>,
    config: &PipelineConfig,
    rules: &TextRules,
    corpus_stem: &str,
    sink: &mut dyn ExportSink,
) -> Result<RunSummary, String> {
    let mut rounds = Vec::with_capacity(config.rounds);

    for round in 1..=config.rounds {
        info!("FINDING COLLOCATIONS ----> STEP {round}");

        if words.is_empty() {
            warn!("Empty token sequence, round {round} is a no-op");
            rounds.push(RoundOutcome {
                stats: RoundStats::collect(round, &words),
                table: FrequencyTable::build(&[], FreqKind::Absolute),
            });
            continue;
        }

        let candidates = score_bigrams(&words, config.min_pair_count);
        words = fuse(words, &candidates, config.strategy, rules);

        let compounds: Vec<String> = words
            .iter()
            .filter(|w| collocation_degree(w) > 0)
            .cloned()
            .collect();
        let table = FrequencyTable::build(&compounds, FreqKind::Absolute);
        log_most_frequent(&table, config.top_n);

        if table.is_empty() {
            info!("No collocations present after round {round}, skipping dictionary export");
        } else {
            sink.write_dictionary(
                corpus_stem,
                &format!("{corpus_stem}_collocations_step_{round}"),
                &table,
                config.export_format,
            )?;
        }
        sink.write_tokens(
            corpus_stem,
            &format!("{corpus_stem}_tokens_step_{round}"),
            &words,
        )?;

        rounds.push(RoundOutcome {
            stats: RoundStats::collect(round, &words),
            table,
        });
    }

    Ok(RunSummary {
        rounds,
        final_tokens: words,
    })
}
