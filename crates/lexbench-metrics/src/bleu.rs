//! BLEU with a brevity penalty and per-order importances, plus a TF-IDF
//! weighted variant.

use std::sync::Arc;

use crate::idf::{IdfTable, TokenWeights};
use crate::ngram::{clipped_overlap, ngram_counts, total};
use crate::{MetricError, TextMetric};

/// Added to every precision before taking its logarithm.
const EPSILON: f64 = 1e-12;

/// Normalise importances to sum to 1. Rejects empty, negative, non-finite or
/// all-zero importances.
pub fn normalized_importances(importances: &[f64]) -> Result<Vec<f64>, MetricError> {
    if importances.is_empty() {
        return Err(MetricError::InvalidConfig("n-gram importances are empty".into()));
    }
    if importances.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(MetricError::InvalidConfig(format!(
            "n-gram importances must be finite and non-negative: {importances:?}"
        )));
    }
    let sum: f64 = importances.iter().sum();
    if sum <= 0.0 {
        return Err(MetricError::InvalidConfig("n-gram importances sum to zero".into()));
    }
    Ok(importances.iter().map(|w| w / sum).collect())
}

/// 1.0 when the candidate is longer than the reference, else
/// `exp(1 - ref_len / cand_len)`.
pub fn brevity_penalty(candidate_len: usize, reference_len: usize) -> f64 {
    if candidate_len > reference_len {
        1.0
    } else if candidate_len == 0 {
        0.0
    } else {
        (1.0 - reference_len as f64 / candidate_len as f64).exp()
    }
}

#[derive(Debug, Clone)]
pub struct Bleu {
    importances: Vec<f64>,
}

impl Bleu {
    pub fn new(importances: &[f64]) -> Result<Self, MetricError> {
        Ok(Self {
            importances: normalized_importances(importances)?,
        })
    }
}

impl Default for Bleu {
    fn default() -> Self {
        Self {
            importances: vec![0.25; 4],
        }
    }
}

impl TextMetric for Bleu {
    fn name(&self) -> &'static str {
        "bleu"
    }

    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        _code: Option<&str>,
    ) -> Result<f64, MetricError> {
        if prediction.is_empty() || reference.is_empty() {
            return Ok(0.0);
        }

        let mut log_precision = 0.0;
        for (i, importance) in self.importances.iter().enumerate() {
            let n = i + 1;
            let candidate_counts = ngram_counts(prediction, n);
            if candidate_counts.is_empty() {
                return Ok(0.0);
            }
            let reference_counts = ngram_counts(reference, n);
            let overlap = clipped_overlap(&candidate_counts, &reference_counts);
            let precision = overlap as f64 / total(&candidate_counts) as f64 + EPSILON;
            log_precision += importance * precision.ln();
        }

        Ok(brevity_penalty(prediction.len(), reference.len()) * log_precision.exp())
    }
}

/// BLEU whose clipped overlaps are weighted by the reference's TF-IDF token
/// weights. Orders with no candidate n-grams are skipped.
#[derive(Debug, Clone)]
pub struct WeightedBleu {
    importances: Vec<f64>,
    idf: Arc<IdfTable>,
}

impl WeightedBleu {
    pub fn new(importances: &[f64], idf: Arc<IdfTable>) -> Result<Self, MetricError> {
        Ok(Self {
            importances: normalized_importances(importances)?,
            idf,
        })
    }
}

impl TextMetric for WeightedBleu {
    fn name(&self) -> &'static str {
        "weighted_bleu"
    }

    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        code: Option<&str>,
    ) -> Result<f64, MetricError> {
        if prediction.is_empty() || reference.is_empty() {
            return Ok(0.0);
        }
        let code = code.ok_or(MetricError::MissingCode {
            metric: self.name(),
        })?;
        let weights = TokenWeights::for_reference(reference, self.idf.weights(code)?, code)?;

        let mut log_precision = 0.0;
        for (i, importance) in self.importances.iter().enumerate() {
            let n = i + 1;
            let candidate_counts = ngram_counts(prediction, n);
            if candidate_counts.is_empty() {
                continue;
            }
            let reference_counts = ngram_counts(reference, n);

            let mut numerator = 0.0;
            let mut denominator = 0.0;
            for (ngram, &count) in &candidate_counts {
                let weight = weights.ngram_weight(ngram);
                let clipped = count.min(reference_counts.get(ngram).copied().unwrap_or(0));
                numerator += clipped as f64 * weight;
                denominator += count as f64 * weight;
            }

            let mut precision = EPSILON;
            if numerator > 0.0 && denominator > 0.0 {
                precision += numerator / denominator;
            }
            log_precision += importance * precision.ln();
        }

        Ok(brevity_penalty(prediction.len(), reference.len()) * log_precision.exp())
    }
}
