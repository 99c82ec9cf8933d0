//! The [`TextMetric`] trait, the closed set of metric kinds and the
//! configuration that builds a [`MetricSet`] from them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lexbench_core::normalize;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::MetricError;
use crate::bleu::{Bleu, WeightedBleu};
use crate::exact::ExactMatch;
use crate::idf::IdfTable;
use crate::rouge_n::RougeN;
use crate::rouge_w::RougeW;
use crate::tfidf_rouge::TfIdfRougeN;

/// Scores outside [0, 1] by less than this are clamped; anything further out
/// is an error.
pub const TOLERANCE: f64 = 1e-9;

pub(crate) fn clamp_unit(metric: &'static str, value: f64) -> Result<f64, MetricError> {
    if value.is_nan() || value < -TOLERANCE || value > 1.0 + TOLERANCE {
        return Err(MetricError::OutOfRange { metric, value });
    }
    Ok(value.clamp(0.0, 1.0))
}

// ── Trait ──

/// A similarity between a predicted and a reference passage, in [0, 1].
pub trait TextMetric {
    fn name(&self) -> &'static str;

    /// Score already-normalised token sequences. `code` selects the IDF table
    /// for weighted metrics and is ignored by the others.
    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        code: Option<&str>,
    ) -> Result<f64, MetricError>;

    /// Normalise both texts, then score them.
    fn score(
        &self,
        prediction: &str,
        reference: &str,
        code: Option<&str>,
    ) -> Result<f64, MetricError> {
        let prediction = normalize(prediction.trim());
        let reference = normalize(reference.trim());
        let value = self.compute(&prediction, &reference, code)?;
        clamp_unit(self.name(), value)
    }

    /// Score pairs position by position. A length mismatch fails before any
    /// pair is scored.
    fn score_batch<P, R>(
        &self,
        predictions: &[P],
        references: &[R],
        code: Option<&str>,
    ) -> Result<Vec<f64>, MetricError>
    where
        Self: Sized,
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if predictions.len() != references.len() {
            return Err(MetricError::LengthMismatch {
                predictions: predictions.len(),
                references: references.len(),
            });
        }
        predictions
            .iter()
            .zip(references)
            .map(|(p, r)| self.score(p.as_ref(), r.as_ref(), code))
            .collect()
    }
}

// ── Kinds ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ExactMatch,
    Bleu,
    WeightedBleu,
    #[serde(rename = "rouge_n_f1")]
    RougeN,
    #[serde(rename = "rouge_n_tfidf")]
    TfIdfRougeN,
    RougeW,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::ExactMatch,
        MetricKind::Bleu,
        MetricKind::WeightedBleu,
        MetricKind::RougeN,
        MetricKind::TfIdfRougeN,
        MetricKind::RougeW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::ExactMatch => "exact_match",
            MetricKind::Bleu => "bleu",
            MetricKind::WeightedBleu => "weighted_bleu",
            MetricKind::RougeN => "rouge_n_f1",
            MetricKind::TfIdfRougeN => "rouge_n_tfidf",
            MetricKind::RougeW => "rouge_w",
        }
    }

    /// Whether building this metric requires an IDF table.
    pub fn needs_idf(&self) -> bool {
        matches!(self, MetricKind::WeightedBleu | MetricKind::TfIdfRougeN)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| MetricError::UnknownMetric(s.to_string()))
    }
}

// ── Configuration ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub metrics: Vec<MetricKind>,
    pub bleu_importances: Vec<f64>,
    pub weighted_bleu_importances: Vec<f64>,
    pub rouge_n_importances: Vec<f64>,
    pub tfidf_rouge_importances: Vec<f64>,
    pub rouge_w_alpha: f64,
    pub rouge_w_beta: f64,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            metrics: MetricKind::ALL.to_vec(),
            bleu_importances: vec![1.0; 4],
            weighted_bleu_importances: vec![1.0, 2.0, 1.0],
            rouge_n_importances: vec![1.0; 3],
            tfidf_rouge_importances: vec![1.0; 3],
            rouge_w_alpha: 1.2,
            rouge_w_beta: 1.0,
        }
    }
}

impl MetricConfig {
    pub fn needs_idf(&self) -> bool {
        self.metrics.iter().any(MetricKind::needs_idf)
    }
}

// ── Metric ──

/// One configured metric of any kind.
#[derive(Debug, Clone)]
pub enum Metric {
    ExactMatch(ExactMatch),
    Bleu(Bleu),
    WeightedBleu(WeightedBleu),
    RougeN(RougeN),
    TfIdfRougeN(TfIdfRougeN),
    RougeW(RougeW),
}

impl Metric {
    pub fn build(
        kind: MetricKind,
        config: &MetricConfig,
        idf: Option<&Arc<IdfTable>>,
    ) -> Result<Self, MetricError> {
        let require_idf = || {
            idf.cloned().ok_or_else(|| {
                MetricError::InvalidConfig(format!("metric {kind} requires an IDF table"))
            })
        };
        Ok(match kind {
            MetricKind::ExactMatch => Metric::ExactMatch(ExactMatch),
            MetricKind::Bleu => Metric::Bleu(Bleu::new(&config.bleu_importances)?),
            MetricKind::WeightedBleu => Metric::WeightedBleu(WeightedBleu::new(
                &config.weighted_bleu_importances,
                require_idf()?,
            )?),
            MetricKind::RougeN => Metric::RougeN(RougeN::new(&config.rouge_n_importances)?),
            MetricKind::TfIdfRougeN => Metric::TfIdfRougeN(TfIdfRougeN::new(
                &config.tfidf_rouge_importances,
                require_idf()?,
            )?),
            MetricKind::RougeW => {
                Metric::RougeW(RougeW::new(config.rouge_w_alpha, config.rouge_w_beta)?)
            }
        })
    }

    /// Build a metric by its report name.
    pub fn from_name(
        name: &str,
        config: &MetricConfig,
        idf: Option<&Arc<IdfTable>>,
    ) -> Result<Self, MetricError> {
        Self::build(name.parse()?, config, idf)
    }

    fn inner(&self) -> &dyn TextMetric {
        match self {
            Metric::ExactMatch(m) => m,
            Metric::Bleu(m) => m,
            Metric::WeightedBleu(m) => m,
            Metric::RougeN(m) => m,
            Metric::TfIdfRougeN(m) => m,
            Metric::RougeW(m) => m,
        }
    }
}

impl TextMetric for Metric {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn compute(
        &self,
        prediction: &[String],
        reference: &[String],
        code: Option<&str>,
    ) -> Result<f64, MetricError> {
        self.inner().compute(prediction, reference, code)
    }
}

// ── Set ──

/// The metrics a scoring run reports, in configuration order.
#[derive(Debug, Clone)]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    pub fn from_config(
        config: &MetricConfig,
        idf: Option<&Arc<IdfTable>>,
    ) -> Result<Self, MetricError> {
        let mut metrics: Vec<Metric> = Vec::with_capacity(config.metrics.len());
        for &kind in &config.metrics {
            if metrics.iter().any(|m| m.name() == kind.as_str()) {
                continue;
            }
            metrics.push(Metric::build(kind, config, idf)?);
        }
        debug!(count = metrics.len(), "built metric set");
        Ok(Self { metrics })
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.metrics.iter().map(|m| m.name())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Every metric on one pair, keyed by name. Stops at the first error.
    pub fn score_all(
        &self,
        prediction: &str,
        reference: &str,
        code: Option<&str>,
    ) -> Result<BTreeMap<String, f64>, MetricError> {
        let mut scores = BTreeMap::new();
        for metric in &self.metrics {
            let value = metric.score(prediction, reference, code)?;
            scores.insert(metric.name().to_string(), value);
        }
        Ok(scores)
    }
}
