//! ROUGE-N as a weighted average of per-order F1 scores.

use crate::ngram::{NgramCounts, clipped_overlap, ngram_counts, total};
use crate::{MetricError, TextMetric};

/// Weighted average of ROUGE-N F1 over n = 1..=N. Index `i` of the
/// importances weighs n-grams of length `i + 1`; zero-weight orders are not
/// computed.
#[derive(Debug, Clone)]
pub struct RougeN {
    importances: Vec<f64>,
}

impl RougeN {
    pub fn new(importances: &[f64]) -> Result<Self, MetricError> {
        if importances.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MetricError::InvalidConfig(format!(
                "n-gram importances must be finite and non-negative: {importances:?}"
            )));
        }
        Ok(Self {
            importances: importances.to_vec(),
        })
    }
}

impl Default for RougeN {
    fn default() -> Self {
        Self {
            importances: vec![1.0; 3],
        }
    }
}

impl TextMetric for RougeN {
    fn name(&self) -> &'static str {
        "rouge_n_f1"
    }

    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        _code: Option<&str>,
    ) -> Result<f64, MetricError> {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for (i, &weight) in self.importances.iter().enumerate() {
            if weight > 0.0 {
                weighted_sum += weight * f1(prediction, reference, i + 1);
                total_weight += weight;
            }
        }

        if total_weight == 0.0 {
            return Ok(0.0);
        }
        Ok(weighted_sum / total_weight)
    }
}

struct Overlap {
    matched: usize,
    candidate_total: usize,
    reference_total: usize,
}

fn overlap(prediction: &[String], reference: &[String], n: usize) -> Overlap {
    let candidate: NgramCounts<'_> = ngram_counts(prediction, n);
    let reference: NgramCounts<'_> = ngram_counts(reference, n);
    Overlap {
        matched: clipped_overlap(&candidate, &reference),
        candidate_total: total(&candidate),
        reference_total: total(&reference),
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Matched n-grams over candidate n-grams.
pub fn precision(prediction: &[String], reference: &[String], n: usize) -> f64 {
    let o = overlap(prediction, reference, n);
    ratio(o.matched, o.candidate_total)
}

/// Matched n-grams over reference n-grams.
pub fn recall(prediction: &[String], reference: &[String], n: usize) -> f64 {
    let o = overlap(prediction, reference, n);
    ratio(o.matched, o.reference_total)
}

/// Harmonic mean of precision and recall; 0 when either is 0.
pub fn f1(prediction: &[String], reference: &[String], n: usize) -> f64 {
    let o = overlap(prediction, reference, n);
    let p = ratio(o.matched, o.candidate_total);
    let r = ratio(o.matched, o.reference_total);
    if p + r == 0.0 {
        return 0.0;
    }
    2.0 * p * r / (p + r)
}
