use std::collections::HashMap;

use log::info;
use serde::Serialize;

/// Whether a table reports absolute counts or proportions of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FreqKind {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub token: String,
    pub count: u64,
    pub share: f64,
}

/// Token frequencies over one snapshot of the corpus, sorted by count
/// descending then token ascending. Read-only once built.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTable {
    pub kind: FreqKind,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Counts the given tokens. An empty snapshot yields an empty table;
    /// the total-count division is never reached in that case.
    pub fn build(words: &[String], kind: FreqKind) -> FrequencyTable {
        if words.is_empty() {
            return FrequencyTable {
                kind,
                entries: Vec::new(),
            };
        }

        let mut counts: HashMap<&str, u64> = HashMap::new();
        for word in words {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
        let total = words.len() as f64;

        let mut entries: Vec<FrequencyEntry> = counts
            .into_iter()
            .map(|(token, count)| FrequencyEntry {
                token: token.to_string(),
                count,
                share: count as f64 / total,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
        info!("Dictionary built, {} entries retained", entries.len());
        FrequencyTable { kind, entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The exported/displayed value of an entry under this table's kind.
    pub fn display_value(&self, entry: &FrequencyEntry) -> String {
        match self.kind {
            FreqKind::Absolute => entry.count.to_string(),
            FreqKind::Relative => entry.share.to_string(),
        }
    }
}

/// Logs the first `n` entries, numbered, with their frequencies.
pub fn log_most_frequent(table: &FrequencyTable, n: usize) {
    if table.is_empty() {
        return;
    }
    info!(
        "Displaying the first {} most frequent entries",
        n.min(table.len())
    );
    for (i, entry) in table.entries.iter().take(n).enumerate() {
        info!("\t{}. {} ({})", i + 1, entry.token, table.display_value(entry));
    }
}
