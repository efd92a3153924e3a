//! Integration tests for `corpus_analysis`.
//
// This suite verifies:
// - Library behavior (preparation, PMI scoring, the three fusion strategies,
//   round loop properties, frequency tables, sentiment scoring)
// - CLI behavior including subcommands, exports, and error paths
//
// Notes:
// - CLI tests run the binary with a per-process working directory (no global CWD change).
// - Tests that change global CWD (library-level outputs) are marked #[serial].

use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use serial_test::serial;

use corpus_analysis::{
    CollocationOptions, FreqKind, FrequencyOptions, FrequencyTable, FuseStrategy,
    SentimentOptions, TextRules, collocation_degree, fuse, run_collocations, run_frequencies,
    run_sentiment, score_bigrams, tokenize,
};

// --------------------- helpers ---------------------

/// Create a file with content in a temp dir.
fn write_file(dir: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
    let f = dir.child(name);
    f.write_str(content).unwrap();
    f.path().to_path_buf()
}

fn seq(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Run CLI successfully with a specific working directory.
fn run_cli_ok_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("corpus_analysis").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().success()
}

/// Run CLI expecting failure with a specific working directory.
fn run_cli_fail_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("corpus_analysis").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().failure()
}

/// One score-then-fuse round over an in-memory sequence.
fn one_round(tokens: Vec<String>, strategy: FuseStrategy, rules: &TextRules) -> Vec<String> {
    let candidates = score_bigrams(&tokens, 2);
    fuse(tokens, &candidates, strategy, rules)
}

fn max_degree(tokens: &[String]) -> usize {
    tokens.iter().map(|t| collocation_degree(t)).max().unwrap_or(0)
}

// --------------------- library tests: scoring ---------------------

#[test]
fn lib_scorer_is_deterministic() {
    let tokens = tokenize("alpha beta gamma alpha beta delta gamma beta alpha beta");
    let first = score_bigrams(&tokens, 2);
    for _ in 0..5 {
        assert_eq!(score_bigrams(&tokens, 2), first);
    }
}

#[test]
fn lib_scorer_applies_count_floor() {
    // ("new", "york") occurs twice and is the only pair over the floor.
    let tokens = seq(&["new", "york", "is", "a", "new", "york", "city"]);
    let candidates = score_bigrams(&tokens, 2);
    assert_eq!(candidates.len(), 1);
    assert_eq!(
        (candidates[0].left.as_str(), candidates[0].right.as_str()),
        ("new", "york")
    );
    assert_eq!(candidates[0].count, 2);
    assert!(candidates[0].score > 0.0);
}

// --------------------- library tests: fusion ---------------------

#[test]
fn lib_round_fuses_repeated_pair() {
    let rules = TextRules::default();
    let tokens = seq(&["new", "york", "is", "a", "new", "york", "city"]);
    let out = one_round(tokens, FuseStrategy::Indexed, &rules);
    assert_eq!(out, seq(&["new_york", "is", "a", "new_york", "city"]));
}

#[test]
fn lib_no_token_is_consumed_twice() {
    // "beta" sits between two qualifying pairs; after (alpha, beta) wins,
    // (beta, gamma) must not also fire on the same occurrence.
    let rules = TextRules::default();
    let tokens = tokenize("alpha beta gamma alpha beta gamma");
    let out = one_round(tokens, FuseStrategy::Indexed, &rules);
    let fused_words: usize = out
        .iter()
        .map(|t| collocation_degree(t) + 1)
        .sum();
    assert_eq!(fused_words, 6, "every original token appears exactly once");
    assert_eq!(out, seq(&["alpha_beta", "gamma", "alpha_beta", "gamma"]));
}

#[test]
fn lib_strategies_produce_identical_streams() {
    let rules = TextRules::default();
    let tokens = tokenize("red apple green pear red apple green pear lone word");
    let candidates = score_bigrams(&tokens, 2);
    let indexed = fuse(tokens.clone(), &candidates, FuseStrategy::Indexed, &rules);
    let ranked = fuse(
        tokens.clone(),
        &candidates,
        FuseStrategy::RankedSubstitution,
        &rules,
    );
    let sweep = fuse(tokens, &candidates, FuseStrategy::FullSweep, &rules);
    assert_eq!(indexed, ranked);
    assert_eq!(indexed, sweep);
}

#[test]
fn lib_saturation_is_idempotent() {
    // Once a round produces no new fusions, every later round is a no-op.
    let rules = TextRules::default();
    let mut tokens = tokenize(&"alpha beta gamma delta ".repeat(30));
    for _ in 0..4 {
        tokens = one_round(tokens, FuseStrategy::Indexed, &rules);
    }
    let saturated = tokens.clone();
    for _ in 0..3 {
        tokens = one_round(tokens, FuseStrategy::Indexed, &rules);
        assert_eq!(tokens, saturated);
    }
}

#[test]
fn lib_max_degree_never_decreases() {
    let rules = TextRules::default();
    let mut tokens = tokenize(&"alpha beta gamma delta ".repeat(30));
    let mut previous = max_degree(&tokens);
    for _ in 0..6 {
        tokens = one_round(tokens, FuseStrategy::Indexed, &rules);
        let current = max_degree(&tokens);
        assert!(current >= previous);
        previous = current;
    }
    assert!(previous >= 1, "repeated phrase must fuse at least once");
}

// --------------------- library tests: round loop + exports ---------------------

#[test]
#[serial]
fn lib_run_collocations_exports_per_round() {
    let td = assert_fs::TempDir::new().unwrap();
    let _corpus = write_file(
        &td,
        "news.txt",
        &"new york is big and new york is loud ".repeat(20),
    );

    let options = CollocationOptions {
        rounds: 3,
        ..CollocationOptions::default()
    };
    std::env::set_current_dir(td.path()).unwrap();
    let summary = run_collocations(Path::new("news.txt"), &options).expect("run succeeds");

    assert_eq!(summary.rounds.len(), 3);
    assert!(summary.rounds[0].stats.fused_total() > 0);
    assert!(
        summary
            .final_tokens
            .iter()
            .any(|t| t.starts_with("new_york")),
        "expected the repeated phrase to fuse"
    );

    // Per-round dictionary + token stream exports under the corpus folder.
    let folder = td.path().join("news");
    assert!(folder.join("news_collocations_step_1.tsv").is_file());
    assert!(folder.join("news_tokens_step_1.txt").is_file());
    assert!(folder.join("news_tokens_step_3.txt").is_file());

    // Timestamped cross-round summary.
    let re = Regex::new(r"^\d{4}_\d{2}_\d{2}_\d{2}_\d{2}_\d{2}_collocation_summary\.txt$").unwrap();
    let found = fs::read_dir(&folder)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| re.is_match(e.file_name().to_string_lossy().as_ref()));
    assert!(found, "Expected timestamped summary in corpus folder");
}

#[test]
#[serial]
fn lib_run_collocations_missing_corpus_errors() {
    let td = assert_fs::TempDir::new().unwrap();
    std::env::set_current_dir(td.path()).unwrap();
    let err = run_collocations(Path::new("absent.txt"), &CollocationOptions::default())
        .unwrap_err();
    assert!(err.contains("absent.txt"), "unexpected error: {err}");
}

#[test]
#[serial]
fn lib_run_collocations_missing_stopwords_continues() {
    let td = assert_fs::TempDir::new().unwrap();
    let _corpus = write_file(&td, "c.txt", &"old town old town river ".repeat(10));

    let options = CollocationOptions {
        stopwords: Some(PathBuf::from("no_such_stopwords.txt")),
        rounds: 1,
        ..CollocationOptions::default()
    };
    std::env::set_current_dir(td.path()).unwrap();
    let summary = run_collocations(Path::new("c.txt"), &options)
        .expect("missing stopword file is a warning, not an error");
    assert!(summary.rounds[0].stats.fused_total() > 0);
}

// --------------------- library tests: frequencies ---------------------

#[test]
fn lib_relative_frequencies_sum_to_one() {
    let table = FrequencyTable::build(&seq(&["a", "a", "b"]), FreqKind::Relative);
    assert!((table.entries[0].share - 2.0 / 3.0).abs() < 1e-12);
    assert!((table.entries[1].share - 1.0 / 3.0).abs() < 1e-12);
    let sum: f64 = table.entries.iter().map(|e| e.share).sum();
    assert!((sum - 1.0).abs() < 1e-12);
}

#[test]
#[serial]
fn lib_run_frequencies_exports_dictionary() {
    let td = assert_fs::TempDir::new().unwrap();
    let _corpus = write_file(&td, "fruits.txt", "apple apple banana orange apple banana");
    let _stop = write_file(&td, "stop.txt", "orange\n");

    let options = FrequencyOptions {
        stopwords: Some(PathBuf::from("stop.txt")),
        kind: FreqKind::Absolute,
        ..FrequencyOptions::default()
    };
    std::env::set_current_dir(td.path()).unwrap();
    let table = run_frequencies(Path::new("fruits.txt"), &options).expect("run succeeds");

    assert_eq!(table.entries[0].token, "apple");
    assert_eq!(table.entries[0].count, 3);
    assert!(table.entries.iter().all(|e| e.token != "orange"));

    let written = fs::read_to_string(td.path().join("fruits/fruits.tsv")).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("apple\t3"));
    assert_eq!(lines.next(), Some("banana\t2"));
}

#[test]
#[serial]
fn lib_run_frequencies_empty_corpus_is_a_noop() {
    let td = assert_fs::TempDir::new().unwrap();
    let _corpus = write_file(&td, "void.txt", "");
    std::env::set_current_dir(td.path()).unwrap();
    let table =
        run_frequencies(Path::new("void.txt"), &FrequencyOptions::default()).expect("no fault");
    assert!(table.is_empty());
    assert!(!td.path().join("void").exists(), "no folder for empty corpus");
}

// --------------------- library tests: sentiment ---------------------

#[test]
#[serial]
fn lib_run_sentiment_scores_and_exports() {
    let td = assert_fs::TempDir::new().unwrap();
    let _corpus = write_file(
        &td,
        "report.txt",
        "Growth was strong. Decline was mild. Growth everywhere.",
    );
    let _lexicon = write_file(&td, "lexicon.csv", "growth;1\ndecline;-1\n");

    std::env::set_current_dir(td.path()).unwrap();
    let report = run_sentiment(
        Path::new("report.txt"),
        Path::new("lexicon.csv"),
        &SentimentOptions::default(),
    )
    .expect("run succeeds");

    // 8 multi-char tokens; growth twice, decline once.
    assert_eq!(report.corpus_tokens, 8);
    assert_eq!(report.terms[0].frequency, 2);
    assert_eq!(report.terms[1].frequency, 1);
    assert!((report.index - 1.0 / 8.0).abs() < 1e-12);

    let exported = fs::read_to_string(td.path().join("report/report_sentiment.csv")).unwrap();
    assert!(exported.contains("Term;Sentiment value;Absolute frequency"));
    assert!(exported.contains("growth;1;2;8;"));
}

#[test]
#[serial]
fn lib_run_sentiment_missing_lexicon_errors() {
    let td = assert_fs::TempDir::new().unwrap();
    let _corpus = write_file(&td, "r.txt", "some words here");
    std::env::set_current_dir(td.path()).unwrap();
    let err = run_sentiment(
        Path::new("r.txt"),
        Path::new("missing_lexicon.csv"),
        &SentimentOptions::default(),
    )
    .unwrap_err();
    assert!(err.contains("missing_lexicon.csv"), "unexpected error: {err}");
}

// --------------------- CLI tests ---------------------

#[test]
fn cli_collocations_basic_run() {
    let td = assert_fs::TempDir::new().unwrap();
    write_file(
        &td,
        "corpus.txt",
        &"hot dog stand near the hot dog cart ".repeat(15),
    );
    let stop = write_file(&td, "stop.txt", "the\nnear\n");

    run_cli_ok_in(
        td.path(),
        &[
            "collocations",
            "corpus.txt",
            "--stopwords",
            stop.to_str().unwrap(),
            "--rounds",
            "2",
            "--export-format",
            "csv",
        ],
    )
    .stdout(predicate::str::contains("round"));

    let folder = td.path().join("corpus");
    assert!(folder.join("corpus_collocations_step_1.csv").is_file());
    assert!(folder.join("corpus_tokens_step_2.txt").is_file());
    let dict = fs::read_to_string(folder.join("corpus_collocations_step_1.csv")).unwrap();
    assert!(dict.contains("hot_dog;"));
}

#[test]
fn cli_collocations_strategy_flag() {
    let td = assert_fs::TempDir::new().unwrap();
    write_file(&td, "c.txt", &"ice cream van ice cream cone ".repeat(10));

    run_cli_ok_in(
        td.path(),
        &[
            "collocations",
            "c.txt",
            "--strategy",
            "full-sweep",
            "--rounds",
            "1",
        ],
    );
    let tokens = fs::read_to_string(td.path().join("c/c_tokens_step_1.txt")).unwrap();
    assert!(tokens.contains("ice_cream"));
}

#[test]
fn cli_missing_corpus_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    run_cli_fail_in(td.path(), &["collocations", "does_not_exist.txt"]);
}

#[test]
fn cli_frequencies_relative_export() {
    let td = assert_fs::TempDir::new().unwrap();
    write_file(&td, "f.txt", "sun sun moon");

    run_cli_ok_in(td.path(), &["frequencies", "f.txt", "--relative"])
        .stdout(predicate::str::contains("2 entries in dictionary"));

    let written = fs::read_to_string(td.path().join("f/f.tsv")).unwrap();
    assert!(written.starts_with("sun\t0.666666666666666"));
}

#[test]
fn cli_frequencies_json_export() {
    let td = assert_fs::TempDir::new().unwrap();
    write_file(&td, "j.txt", "left right left");

    run_cli_ok_in(
        td.path(),
        &["frequencies", "j.txt", "--export-format", "json"],
    );

    let written = fs::read_to_string(td.path().join("j/j.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid json");
    let entries = parsed.as_array().expect("json array");
    assert_eq!(entries[0]["token"], "left");
    assert_eq!(entries[0]["count"], 2);
}

#[test]
fn cli_sentiment_reports_index() {
    let td = assert_fs::TempDir::new().unwrap();
    write_file(&td, "s.txt", "gains gains losses and filler words here");
    write_file(&td, "lex.csv", "gains;1\nlosses;-1\n");

    run_cli_ok_in(
        td.path(),
        &["sentiment", "s.txt", "--lexicon", "lex.csv"],
    )
    .stdout(predicate::str::contains("Sentiment index ="));

    assert!(td.path().join("s/s_sentiment.csv").is_file());
}

#[test]
fn cli_sentiment_exclude_flag() {
    let td = assert_fs::TempDir::new().unwrap();
    write_file(&td, "s2.txt", "Boom boom doom");
    write_file(&td, "lex.csv", "boom;1\n");

    run_cli_ok_in(
        td.path(),
        &[
            "sentiment",
            "s2.txt",
            "--lexicon",
            "lex.csv",
            "--exclude",
            "Boom",
        ],
    );

    let exported = fs::read_to_string(td.path().join("s2/s2_sentiment.csv")).unwrap();
    // Capitalized finding excluded, lowercase one kept.
    assert!(exported.contains("boom;1;1;3;"));
}
