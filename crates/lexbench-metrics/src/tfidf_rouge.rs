//! Recall-only ROUGE-N with n-grams weighted by the reference's TF-IDF token
//! weights.

use std::sync::Arc;

use crate::idf::{IdfTable, TokenWeights};
use crate::ngram::ngram_counts;
use crate::{MetricError, TextMetric};

#[derive(Debug, Clone)]
pub struct TfIdfRougeN {
    importances: Vec<f64>,
    idf: Arc<IdfTable>,
}

impl TfIdfRougeN {
    pub fn new(importances: &[f64], idf: Arc<IdfTable>) -> Result<Self, MetricError> {
        if importances.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MetricError::InvalidConfig(format!(
                "n-gram importances must be finite and non-negative: {importances:?}"
            )));
        }
        Ok(Self {
            importances: importances.to_vec(),
            idf,
        })
    }

    /// Weighted recall of order `n`: Σ clipped·w / Σ count·w over reference
    /// n-grams.
    pub fn recall(
        &self,
        prediction: &[String],
        reference: &[String],
        n: usize,
        weights: &TokenWeights<'_>,
    ) -> f64 {
        let candidate_counts = ngram_counts(prediction, n);
        let reference_counts = ngram_counts(reference, n);

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (ngram, &count) in &reference_counts {
            let weight = weights.ngram_weight(ngram);
            let matched = count.min(candidate_counts.get(ngram).copied().unwrap_or(0));
            numerator += matched as f64 * weight;
            denominator += count as f64 * weight;
        }

        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }
}

impl TextMetric for TfIdfRougeN {
    fn name(&self) -> &'static str {
        "rouge_n_tfidf"
    }

    /// Averages over orders no longer than the shorter input.
    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        code: Option<&str>,
    ) -> Result<f64, MetricError> {
        let max_order = prediction.len().min(reference.len());
        if max_order == 0 {
            return Ok(0.0);
        }
        let code = code.ok_or(MetricError::MissingCode {
            metric: self.name(),
        })?;
        let weights = TokenWeights::for_reference(reference, self.idf.weights(code)?, code)?;

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (i, &importance) in self.importances.iter().enumerate() {
            let n = i + 1;
            if importance > 0.0 && n <= max_order {
                weighted_sum += importance * self.recall(prediction, reference, n, &weights);
                total_weight += importance;
            }
        }

        if total_weight == 0.0 {
            return Ok(0.0);
        }
        Ok(weighted_sum / total_weight)
    }
}
