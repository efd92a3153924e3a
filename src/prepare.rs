use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Literal tables shared by preparation and fusion: punctuation token
/// literals, strippable character classes, diacritic foldings.
///
/// Passed into the components that need them instead of living as
/// process-wide state, so callers can substitute their own tables.
#[derive(Debug, Clone)]
pub struct TextRules {
    /// Tokens that count as punctuation literals (never fused, removable).
    pub punctuation_tokens: Vec<String>,
    /// Characters stripped out of tokens during pre-processing.
    pub punctuation_chars: Vec<char>,
    /// Digit characters stripped out of tokens during pre-processing.
    pub digit_chars: Vec<char>,
    /// Diacritic characters and their folded replacements.
    pub diacritic_foldings: Vec<(char, char)>,
    /// Unicode punctuation replaced by a space during pre-processing.
    pub unicode_punctuation: Vec<char>,
}

impl Default for TextRules {
    fn default() -> Self {
        TextRules {
            punctuation_tokens: [
                ".", "..", "...", ",", ";", ":", "(", ")", "\"", "'", "[", "]", "{", "}", "?",
                "!", "-", "–", "+", "*", "--", "''", "``",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            punctuation_chars: "?.!/;:()&+%".chars().collect(),
            digit_chars: "0123456789".chars().collect(),
            diacritic_foldings: vec![
                ('ț', 't'),
                ('ă', 'a'),
                ('î', 'i'),
                ('ș', 's'),
                ('â', 'a'),
                ('ţ', 't'),
                ('ş', 's'),
                ('à', 'a'),
            ],
            unicode_punctuation: vec!['”', '’', '…', '„', '“', ','],
        }
    }
}

impl TextRules {
    pub fn is_punctuation_token(&self, token: &str) -> bool {
        self.punctuation_tokens.iter().any(|t| t == token)
    }
}

/// Which normalization sub-steps to apply. All of them default to on; the
/// order of application is fixed regardless of which ones are enabled.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub lowercase: bool,
    pub unicode_punctuation: bool,
    pub diacritics: bool,
    pub punctuation: bool,
    pub digits: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            lowercase: true,
            unicode_punctuation: true,
            diacritics: true,
            punctuation: true,
            digits: true,
        }
    }
}

fn word_pattern() -> Regex {
    Regex::new(r"\w+").expect("word pattern compiles")
}

/// Splits text into lowercase word tokens (maximal runs of Unicode word
/// characters). Empty tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Loads all word tokens from a UTF-8 text file. Used for both the corpus
/// and the stopword list.
pub fn load_words(path: &Path) -> Result<Vec<String>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let words = tokenize(&raw);
    info!(
        "{} words loaded from {} [{:.3} Mb]",
        words.len(),
        path.display(),
        raw.len() as f64 / (1024.0 * 1024.0)
    );
    Ok(words)
}

/// Loads a stopword set, or an empty set with a warning if the file is
/// missing or unreadable (stopword removal is then skipped, not aborted).
pub fn load_stopwords(path: &Path) -> HashSet<String> {
    match load_words(path) {
        Ok(words) => words.into_iter().collect(),
        Err(e) => {
            warn!("Skipping stopword removal: {e}");
            HashSet::new()
        }
    }
}

/// Retains only tokens not present in the stopword set, preserving order.
pub fn remove_stopwords(words: Vec<String>, stopwords: &HashSet<String>) -> Vec<String> {
    if stopwords.is_empty() {
        return words;
    }
    info!("Removing stopwords...");
    let kept: Vec<String> = words.into_iter().filter(|w| !stopwords.contains(w)).collect();
    info!("{} words retained from text", kept.len());
    kept
}

/// Applies the normalization sub-steps in fixed order: lowercase, unicode
/// punctuation stripping, diacritic folding, punctuation-token removal plus
/// punctuation-character stripping, digit stripping, blank-token removal.
/// Each sub-step is total; a token reduced to nothing is dropped at the end.
pub fn pre_process(
    words: Vec<String>,
    opts: &NormalizeOptions,
    rules: &TextRules,
) -> Vec<String> {
    info!("Pre-processing {} words...", words.len());
    let mut document = words;

    if opts.lowercase {
        document = document.iter().map(|w| w.to_lowercase()).collect();
    }

    if opts.unicode_punctuation {
        document = document
            .iter()
            .map(|w| strip_unicode_punctuation(w, rules))
            .collect();
    }

    if opts.diacritics {
        document = document.iter().map(|w| fold_diacritics(w, rules)).collect();
    }

    if opts.punctuation {
        document.retain(|w| !rules.is_punctuation_token(w));
        document = document
            .iter()
            .map(|w| strip_chars(w, &rules.punctuation_chars))
            .collect();
    }

    if opts.digits {
        document = document
            .iter()
            .map(|w| strip_chars(w, &rules.digit_chars))
            .collect();
    }

    let document: Vec<String> = document
        .iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect();
    info!("{} words remaining after pre-processing", document.len());
    document
}

fn strip_unicode_punctuation(word: &str, rules: &TextRules) -> String {
    word.chars()
        .map(|c| {
            if rules.unicode_punctuation.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

fn fold_diacritics(word: &str, rules: &TextRules) -> String {
    word.chars()
        .map(|c| {
            rules
                .diacritic_foldings
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

fn strip_chars(word: &str, banned: &[char]) -> String {
    word.chars().filter(|c| !banned.contains(c)).collect()
}

/// Reduces every token to its Snowball stem. The stemmer language is the
/// detected dominant language of the joined stream; undetected or
/// unsupported languages fall back to English.
pub fn apply_stemming(words: &[String]) -> Vec<String> {
    if words.is_empty() {
        return Vec::new();
    }
    let algorithm = stemmer_algorithm(words);
    let stemmer = Stemmer::create(algorithm);
    words.iter().map(|w| stemmer.stem(w).into_owned()).collect()
}

fn stemmer_algorithm(words: &[String]) -> Algorithm {
    let joined = words.join(" ");
    match whatlang::detect(&joined).map(|info| info.lang()) {
        Some(whatlang::Lang::Deu) => Algorithm::German,
        Some(whatlang::Lang::Eng) => Algorithm::English,
        Some(whatlang::Lang::Spa) => Algorithm::Spanish,
        Some(whatlang::Lang::Fra) => Algorithm::French,
        Some(whatlang::Lang::Hun) => Algorithm::Hungarian,
        Some(whatlang::Lang::Ita) => Algorithm::Italian,
        Some(whatlang::Lang::Ron) => Algorithm::Romanian,
        other => {
            if let Some(lang) = other {
                info!(
                    "Language {} has no stemmer, falling back to English",
                    lang.code()
                );
            } else {
                warn!("Language detection failed, falling back to English");
            }
            Algorithm::English
        }
    }
}
