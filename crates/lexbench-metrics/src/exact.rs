use crate::{MetricError, TextMetric};

/// 1.0 when the normalised token sequences are identical, else 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl TextMetric for ExactMatch {
    fn name(&self) -> &'static str {
        "exact_match"
    }

    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        _code: Option<&str>,
    ) -> Result<f64, MetricError> {
        Ok(if prediction == reference { 1.0 } else { 0.0 })
    }
}
