//! ROUGE-W: weighted longest common subsequence.
//!
//! A run of `k` consecutive matches contributes `f(k) = k^alpha`, so unbroken
//! runs outscore the same number of scattered matches when `alpha > 1`.
//! With `alpha = 1` this is plain LCS.

use crate::metric::clamp_unit;
use crate::{MetricError, TextMetric};

#[derive(Debug, Clone, Copy)]
pub struct RougeW {
    alpha: f64,
    beta: f64,
}

impl RougeW {
    pub fn new(alpha: f64, beta: f64) -> Result<Self, MetricError> {
        if !alpha.is_finite() || alpha < 1.0 {
            return Err(MetricError::InvalidConfig(format!(
                "rouge_w alpha must be >= 1.0, got {alpha}"
            )));
        }
        if !beta.is_finite() || beta < 0.0 {
            return Err(MetricError::InvalidConfig(format!(
                "rouge_w beta must be >= 0.0, got {beta}"
            )));
        }
        Ok(Self { alpha, beta })
    }

    pub fn weight(&self, k: f64) -> f64 {
        k.powf(self.alpha)
    }

    pub fn inverse_weight(&self, value: f64) -> f64 {
        value.max(0.0).powf(1.0 / self.alpha)
    }

    /// WLCS score over a `(ref_len + 1) × (cand_len + 1)` table, tracking the
    /// length of the consecutive run ending at each cell.
    pub fn wlcs(&self, prediction: &[String], reference: &[String]) -> f64 {
        let m = reference.len();
        let n = prediction.len();
        if m == 0 || n == 0 {
            return 0.0;
        }

        let cols = n + 1;
        let mut score = vec![0.0f64; (m + 1) * cols];
        let mut run = vec![0usize; (m + 1) * cols];

        for i in 1..=m {
            for j in 1..=n {
                let here = i * cols + j;
                if reference[i - 1] == prediction[j - 1] {
                    let diag = (i - 1) * cols + (j - 1);
                    let k = run[diag] as f64;
                    score[here] = score[diag] + self.weight(k + 1.0) - self.weight(k);
                    run[here] = run[diag] + 1;
                } else {
                    let up = score[(i - 1) * cols + j];
                    let left = score[here - 1];
                    score[here] = if up > left { up } else { left };
                    run[here] = 0;
                }
            }
        }

        score[m * cols + n]
    }

    pub fn recall(&self, prediction: &[String], reference: &[String]) -> Result<f64, MetricError> {
        if reference.is_empty() {
            return Ok(0.0);
        }
        let value = self.inverse_weight(self.wlcs(prediction, reference)) / reference.len() as f64;
        clamp_unit(self.name(), value)
    }

    pub fn precision(
        &self,
        prediction: &[String],
        reference: &[String],
    ) -> Result<f64, MetricError> {
        if prediction.is_empty() {
            return Ok(0.0);
        }
        let value = self.inverse_weight(self.wlcs(prediction, reference)) / prediction.len() as f64;
        clamp_unit(self.name(), value)
    }

    /// F-beta combination of WLCS precision and recall.
    pub fn f_measure(
        &self,
        prediction: &[String],
        reference: &[String],
    ) -> Result<f64, MetricError> {
        let recall = self.recall(prediction, reference)?;
        let precision = self.precision(prediction, reference)?;
        let beta_sq = self.beta * self.beta;

        let denominator = recall + beta_sq * precision;
        if denominator == 0.0 {
            return Ok(0.0);
        }
        clamp_unit(
            self.name(),
            (1.0 + beta_sq) * precision * recall / denominator,
        )
    }
}

impl Default for RougeW {
    fn default() -> Self {
        Self {
            alpha: 1.2,
            beta: 1.0,
        }
    }
}

impl TextMetric for RougeW {
    fn name(&self) -> &'static str {
        "rouge_w"
    }

    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        _code: Option<&str>,
    ) -> Result<f64, MetricError> {
        self.f_measure(prediction, reference)
    }
}
