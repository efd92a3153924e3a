use std::collections::HashMap;

/// An adjacent word pair with its raw co-occurrence count and association
/// score, as produced by [`score_bigrams`].
#[derive(Debug, Clone, PartialEq)]
pub struct BigramCandidate {
    pub left: String,
    pub right: String,
    pub count: usize,
    pub score: f64,
}

/// Scores every adjacent bigram in the sequence by pointwise mutual
/// information and returns the candidates ranked best-first.
///
/// Bigrams seen fewer than `min_count` times are discarded (a hard floor,
/// not a ratio). Ties in score are broken by first occurrence in the
/// sequence, so the ranking is reproducible for identical input.
pub fn score_bigrams(tokens: &[String], min_count: usize) -> Vec<BigramCandidate> {
    if tokens.len() < 2 {
        return Vec::new();
    }

    let mut unigrams: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        *unigrams.entry(token.as_str()).or_insert(0) += 1;
    }

    // (count, first occurrence index) per adjacent pair, window of 2.
    let mut bigrams: HashMap<(&str, &str), (usize, usize)> = HashMap::new();
    for (index, pair) in tokens.windows(2).enumerate() {
        let key = (pair[0].as_str(), pair[1].as_str());
        let entry = bigrams.entry(key).or_insert((0, index));
        entry.0 += 1;
    }

    let total_tokens = tokens.len() as f64;
    let total_pairs = (tokens.len() - 1) as f64;

    let mut candidates: Vec<(BigramCandidate, usize)> = bigrams
        .into_iter()
        .filter(|(_, (count, _))| *count >= min_count)
        .map(|((left, right), (count, first_seen))| {
            let p_pair = count as f64 / total_pairs;
            let p_left = unigrams[left] as f64 / total_tokens;
            let p_right = unigrams[right] as f64 / total_tokens;
            let score = (p_pair / (p_left * p_right)).log2();
            (
                BigramCandidate {
                    left: left.to_string(),
                    right: right.to_string(),
                    count,
                    score,
                },
                first_seen,
            )
        })
        .collect();

    candidates.sort_by(|(a, a_seen), (b, b_seen)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a_seen.cmp(b_seen))
    });

    candidates.into_iter().map(|(candidate, _)| candidate).collect()
}
