//! Bag-of-words relevance scoring over past exchanges.
//!
//! # Scoring
//!
//! ```text
//! score = |Q ∩ question_words| + 0.5 × |Q ∩ answer_words|
//! ```
//!
//! where every word set is the lowercase, whitespace-split token set of
//! the respective text. Entries scoring zero are dropped. Survivors are
//! ordered by descending score; ties keep insertion order.
//!
//! This is a linear scan with no index, fine for a conversation log but
//! not for large corpora.

use std::collections::HashSet;

use crate::models::MemoryEntry;

/// Lowercase whitespace tokens as a set.
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Overlap score of one entry against pre-tokenized query words.
pub fn score_entry(query_words: &HashSet<String>, entry: &MemoryEntry) -> f64 {
    let question_hits = word_set(&entry.question)
        .intersection(query_words)
        .count();
    let answer_hits = word_set(&entry.answer).intersection(query_words).count();
    question_hits as f64 + 0.5 * answer_hits as f64
}

/// Rank `entries` against `query`, returning at most `limit` matches.
pub fn rank_entries<'a>(
    query: &str,
    entries: &'a [MemoryEntry],
    limit: usize,
) -> Vec<&'a MemoryEntry> {
    let query_words = word_set(query);
    if query_words.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &MemoryEntry)> = entries
        .iter()
        .map(|e| (score_entry(&query_words, e), e))
        .filter(|(score, _)| *score > 0.0)
        .collect();

    // sort_by is stable: equal scores stay in insertion order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored.into_iter().map(|(_, e)| e).collect()
}
