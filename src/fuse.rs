use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use log::warn;
use regex::{NoExpand, Regex};

use crate::prepare::{TextRules, tokenize};
use crate::score::BigramCandidate;

/// Separator joining the constituents of a compound token. Normalized text
/// never contains it as word-internal punctuation, so the number of
/// separators in a token equals the number of fusion rounds applied to it.
pub const SEPARATOR: char = '_';

/// Number of fusions a token has been through (0 for a plain word).
pub fn collocation_degree(token: &str) -> usize {
    token.chars().filter(|c| *c == SEPARATOR).count()
}

/// How qualifying bigrams are rewritten into compound tokens.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseStrategy {
    /// Index all candidates, then one linear scan. The fast default.
    Indexed,
    /// Whole-corpus text substitution per candidate, best-scored first.
    /// Substitutions touching overlapping spans are resolved in rank
    /// order with no atomicity guarantee; that ordering dependence is an
    /// accepted trade-off of this strategy.
    RankedSubstitution,
    /// One full scan per candidate, best-scored first. Slowest, but each
    /// bigram is fully resolved before the next is considered.
    FullSweep,
}

/// A pair may fuse only if both sides are non-empty, distinct, longer than
/// one character, and neither is a punctuation literal.
pub fn is_eligible(left: &str, right: &str, rules: &TextRules) -> bool {
    !left.is_empty()
        && !right.is_empty()
        && left != right
        && left.chars().count() > 1
        && right.chars().count() > 1
        && !rules.is_punctuation_token(left)
        && !rules.is_punctuation_token(right)
}

fn fused(left: &str, right: &str) -> String {
    format!("{left}{SEPARATOR}{right}")
}

/// Rewrites the sequence by merging qualifying adjacent candidate pairs
/// into compound tokens. The input snapshot is consumed and the next
/// round's sequence returned; a token consumed by a fusion cannot take
/// part in another fusion within the same pass.
pub fn fuse(
    tokens: Vec<String>,
    candidates: &[BigramCandidate],
    strategy: FuseStrategy,
    rules: &TextRules,
) -> Vec<String> {
    if tokens.is_empty() || candidates.is_empty() {
        return tokens;
    }
    let eligible: Vec<&BigramCandidate> = candidates
        .iter()
        .filter(|c| is_eligible(&c.left, &c.right, rules))
        .collect();
    if eligible.is_empty() {
        return tokens;
    }
    match strategy {
        FuseStrategy::Indexed => fuse_indexed(tokens, &eligible),
        FuseStrategy::RankedSubstitution => fuse_ranked_substitution(tokens, &eligible),
        FuseStrategy::FullSweep => fuse_full_sweep(tokens, &eligible),
    }
}

/// Left token -> acceptable right tokens, then a single left-to-right scan.
fn fuse_indexed(tokens: Vec<String>, candidates: &[&BigramCandidate]) -> Vec<String> {
    let mut index: HashMap<&str, HashSet<&str>> = HashMap::new();
    for candidate in candidates {
        index
            .entry(candidate.left.as_str())
            .or_default()
            .insert(candidate.right.as_str());
    }

    let mut document = Vec::with_capacity(tokens.len());
    let mut consumed = false;
    for (i, word) in tokens.iter().enumerate() {
        if consumed {
            consumed = false;
            continue;
        }
        if let Some(next) = tokens.get(i + 1) {
            if index
                .get(word.as_str())
                .is_some_and(|rights| rights.contains(next.as_str()))
            {
                document.push(fused(word, next));
                consumed = true;
                continue;
            }
        }
        document.push(word.clone());
    }
    document
}

/// Joins the sequence into one space-separated text and substitutes each
/// candidate pair across the whole text, best-scored first, re-tokenizing
/// once at the end.
fn fuse_ranked_substitution(tokens: Vec<String>, candidates: &[&BigramCandidate]) -> Vec<String> {
    let mut corpus = tokens.join(" ");
    for candidate in candidates {
        let pattern = format!(
            r"\b{}\b\s\b{}\b",
            regex::escape(&candidate.left),
            regex::escape(&candidate.right)
        );
        match Regex::new(&pattern) {
            Ok(re) => {
                let replacement = fused(&candidate.left, &candidate.right);
                corpus = re.replace_all(&corpus, NoExpand(&replacement)).into_owned();
            }
            Err(e) => {
                warn!(
                    "Skipping unsubstitutable pair ({}, {}): {e}",
                    candidate.left, candidate.right
                );
            }
        }
    }
    tokenize(&corpus)
}

/// One full scan of the sequence per candidate, best-scored first. Every
/// occurrence of a pair is resolved before the next candidate is taken up.
fn fuse_full_sweep(mut tokens: Vec<String>, candidates: &[&BigramCandidate]) -> Vec<String> {
    for candidate in candidates {
        let mut document = Vec::with_capacity(tokens.len());
        let mut consumed = false;
        for (i, word) in tokens.iter().enumerate() {
            if consumed {
                consumed = false;
                continue;
            }
            if word.as_str() == candidate.left
                && tokens.get(i + 1).is_some_and(|next| next.as_str() == candidate.right)
            {
                document.push(fused(&candidate.left, &candidate.right));
                consumed = true;
            } else {
                document.push(word.clone());
            }
        }
        tokens = document;
    }
    tokens
}
