//! N-gram counting over normalised token sequences.

use std::collections::HashMap;

pub type NgramCounts<'a> = HashMap<&'a [String], usize>;

/// Multiset of contiguous `n`-token windows. Empty when `n` is zero or longer
/// than the sequence.
pub fn ngram_counts(tokens: &[String], n: usize) -> NgramCounts<'_> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Total number of n-grams in a multiset.
pub fn total(counts: &NgramCounts<'_>) -> usize {
    counts.values().sum()
}

/// Overlap of two multisets, each n-gram clipped to its count in `other`.
pub fn clipped_overlap(counts: &NgramCounts<'_>, other: &NgramCounts<'_>) -> usize {
    counts
        .iter()
        .map(|(ngram, &count)| count.min(other.get(ngram).copied().unwrap_or(0)))
        .sum()
}
