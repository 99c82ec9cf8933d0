//! Per-code inverse document frequency tables.
//!
//! Each article of a legal code is one document. Tokens come from the same
//! [`normalize`] routine the metrics use, applied to reflowed article text,
//! so index-side and metric-side tokens always agree.

use std::collections::{BTreeMap, HashMap, HashSet};

use lexbench_core::{format_code_abbreviation, normalize, reflow};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::MetricError;

/// Token → IDF weight, keyed by normalised code abbreviation (`kk`, `krio`).
///
/// Immutable once built; share it behind an `Arc` between metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdfTable {
    codes: BTreeMap<String, HashMap<String, f64>>,
}

/// Smoothed IDF: `ln((N + 1) / (df + 1)) + 1`. Finite and at least 1 for any
/// `df <= N`, non-increasing in `df`.
pub fn idf_value(total_docs: usize, doc_freq: usize) -> f64 {
    ((total_docs as f64 + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0
}

impl IdfTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(code, articles)` pairs.
    pub fn build<C, K, D, S>(corpus: C) -> Self
    where
        C: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (code, articles) in corpus {
            table.insert_code(code.as_ref(), articles);
        }
        table
    }

    /// Index one code's articles, replacing any previous table for the code.
    /// Returns the number of documents indexed; a code without articles is
    /// left out.
    pub fn insert_code<D, S>(&mut self, code: &str, articles: D) -> usize
    where
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = format_code_abbreviation(code);
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_docs = 0usize;

        for article in articles {
            let tokens: HashSet<String> =
                normalize(&reflow(article.as_ref())).into_iter().collect();
            for token in tokens {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
            total_docs += 1;
        }

        if total_docs == 0 {
            warn!(code = %key, "no articles, skipping IDF table");
            return 0;
        }

        let weights: HashMap<String, f64> = doc_freq
            .into_iter()
            .map(|(token, df)| (token, idf_value(total_docs, df)))
            .collect();

        info!(code = %key, articles = total_docs, tokens = weights.len(), "built IDF table");
        self.codes.insert(key, weights);
        total_docs
    }

    /// Token weights of a code. `code` may be given in any spelling that
    /// normalises to the same key (`k.k.`, `kk`).
    pub fn weights(&self, code: &str) -> Result<&HashMap<String, f64>, MetricError> {
        let key = format_code_abbreviation(code);
        self.codes
            .get(&key)
            .ok_or(MetricError::UnknownCode(key))
    }

    pub fn idf(&self, code: &str, token: &str) -> Option<f64> {
        self.weights(code).ok()?.get(token).copied()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains_key(&format_code_abbreviation(code))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// TF×IDF weight of every distinct reference token, with TF taken over the
/// reference itself.
#[derive(Debug)]
pub struct TokenWeights<'a> {
    weights: HashMap<&'a str, f64>,
    max: f64,
}

impl<'a> TokenWeights<'a> {
    /// Fails with [`MetricError::UnknownToken`] when a reference token is
    /// missing from the code's table.
    pub fn for_reference(
        reference: &'a [String],
        idf: &HashMap<String, f64>,
        code: &str,
    ) -> Result<Self, MetricError> {
        let mut counts: HashMap<&'a str, usize> = HashMap::new();
        for token in reference {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }

        let len = reference.len() as f64;
        let mut weights = HashMap::with_capacity(counts.len());
        for (token, count) in counts {
            let token_idf = idf.get(token).ok_or_else(|| MetricError::UnknownToken {
                token: token.to_string(),
                code: format_code_abbreviation(code),
            })?;
            weights.insert(token, count as f64 / len * token_idf);
        }

        let max = weights.values().copied().fold(0.0, f64::max);
        Ok(Self { weights, max })
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.weights.get(token).copied()
    }

    /// Mean of the n-gram's token weights, each scaled by the largest
    /// reference token weight. Tokens absent from the reference weigh 0.
    pub fn ngram_weight(&self, ngram: &[String]) -> f64 {
        if ngram.is_empty() || self.max <= 0.0 {
            return 0.0;
        }
        let sum: f64 = ngram
            .iter()
            .map(|token| self.weights.get(token.as_str()).copied().unwrap_or(0.0) / self.max)
            .sum();
        sum / ngram.len() as f64
    }
}
