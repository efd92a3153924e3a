use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// One lexicon term scored against the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermScore {
    pub term: String,
    pub value: f64,
    pub frequency: u64,
    pub corpus_tokens: u64,
    /// `frequency / corpus_tokens * value`.
    pub contribution: f64,
    /// The matched surface forms, in corpus order, minus excluded findings.
    pub occurrences: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub corpus: String,
    pub corpus_tokens: u64,
    /// Sum of all term contributions.
    pub index: f64,
    pub terms: Vec<TermScore>,
}

/// Reads the raw corpus text for sentiment matching (the term patterns run
/// against the unmodified text, not a token stream).
pub fn load_corpus(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

/// Loads a sentiment lexicon of `term;value` lines. Blank lines and lines
/// starting with `#` are skipped; malformed lines are warned about and
/// dropped rather than failing the load.
pub fn load_lexicon(path: &Path) -> Result<Vec<(String, f64)>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read lexicon {}: {e}", path.display()))?;

    let mut lexicon = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, ';');
        let term = parts.next().unwrap_or("").trim();
        let value = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
        match value {
            Some(value) if !term.is_empty() => lexicon.push((term.to_string(), value)),
            _ => warn!("Skipping malformed lexicon line {}: {line}", number + 1),
        }
    }
    info!("{} lexicon terms loaded from {}", lexicon.len(), path.display());
    Ok(lexicon)
}

/// Corpus size for the contribution denominator: `\w+` runs longer than
/// one character.
pub fn count_corpus_tokens(text: &str) -> u64 {
    match Regex::new(r"\w+") {
        Ok(re) => re
            .find_iter(text)
            .filter(|m| m.as_str().chars().count() > 1)
            .count() as u64,
        Err(_) => 0,
    }
}

/// Turns a lexicon term into a whole-word, case-insensitive pattern:
/// `?` matches any single character, `*` any non-space run, `|` is
/// stripped, everything else matches literally.
fn term_pattern(term: &str) -> String {
    let mut pattern = String::from(r"\b");
    for c in term.chars() {
        match c {
            '?' => pattern.push('.'),
            '*' => pattern.push_str(r"\S+"),
            '|' => {}
            '.' | '^' | '$' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    pattern.push_str(r"\b");
    pattern
}

/// Scores the corpus against the lexicon. Each term contributes
/// `frequency / corpus_tokens * value`; the sentiment index is the sum.
/// A zero-token corpus short-circuits before the division.
pub fn score_sentiment(
    corpus: &str,
    corpus_name: &str,
    lexicon: &[(String, f64)],
    excluded: &HashSet<String>,
) -> SentimentReport {
    let corpus_tokens = count_corpus_tokens(corpus);
    info!("{corpus_tokens} words in corpus");

    if corpus_tokens == 0 {
        warn!("Empty corpus, sentiment scoring skipped");
        return SentimentReport {
            corpus: corpus_name.to_string(),
            corpus_tokens: 0,
            index: 0.0,
            terms: Vec::new(),
        };
    }

    let mut terms = Vec::with_capacity(lexicon.len());
    let mut index = 0.0;
    for (term, value) in lexicon {
        if term.is_empty() {
            continue;
        }
        let re = match RegexBuilder::new(&term_pattern(term))
            .case_insensitive(true)
            .multi_line(true)
            .build()
        {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping lexicon term {term}: {e}");
                continue;
            }
        };
        let occurrences: Vec<String> = re
            .find_iter(corpus)
            .map(|m| m.as_str().to_string())
            .filter(|found| !excluded.contains(found))
            .collect();
        let frequency = occurrences.len() as u64;
        let contribution = frequency as f64 / corpus_tokens as f64 * value;
        index += contribution;
        terms.push(TermScore {
            term: term.clone(),
            value: *value,
            frequency,
            corpus_tokens,
            contribution,
            occurrences,
        });
    }

    SentimentReport {
        corpus: corpus_name.to_string(),
        corpus_tokens,
        index,
        terms,
    }
}

/// Logs the report as the aligned table shown on every run.
pub fn log_sentiment(report: &SentimentReport) {
    info!("---------------------------------------------------");
    info!("Corpus {}", report.corpus);
    info!("Sentiment Index = {:>20.15}", report.index);
    info!("---------------------------------------------------");
    info!(
        "{:20} {:>3} {:>10} {:>10} {:>20} {}",
        "Term", "Val", "Abs.freq.", "Tokens", "Contribution", "Occurrences"
    );
    for term in &report.terms {
        info!(
            "{:20} {:>3} {:>10} {:>10} {:>20.15} {:?}",
            term.term, term.value, term.frequency, term.corpus_tokens, term.contribution,
            term.occurrences
        );
    }
}

/// The semicolon-separated export block written next to the dictionaries.
pub fn format_sentiment_export(report: &SentimentReport) -> String {
    let mut export = String::new();
    export.push_str("---------------------------------------------------\n");
    export.push_str(&format!("Corpus: {}\n", report.corpus));
    export.push_str(&format!("Sentiment Index = {:>20.15}\n", report.index));
    export.push_str("---------------------------------------------------\n\n");
    export.push_str(
        "Term;Sentiment value;Absolute frequency;Corpus size (tokens);Contribution of term;Occurrences\n",
    );
    for term in &report.terms {
        export.push_str(&format!(
            "{};{};{};{};{:.15};{:?}\n",
            term.term, term.value, term.frequency, term.corpus_tokens, term.contribution,
            term.occurrences
        ));
    }
    export
}
