//! Similarity metrics for comparing a model's quotation of a provision with
//! the statute text.
//!
//! Every metric normalises both texts with [`lexbench_core::normalize`] and
//! returns a score in [0, 1]. The TF-IDF weighted metrics read token weights
//! from a per-code [`IdfTable`].

pub mod bleu;
mod error;
pub mod exact;
pub mod idf;
pub mod metric;
pub mod ngram;
pub mod rouge_n;
pub mod rouge_w;
pub mod tfidf_rouge;

pub use bleu::{Bleu, WeightedBleu};
pub use error::MetricError;
pub use exact::ExactMatch;
pub use idf::{IdfTable, TokenWeights};
pub use metric::{Metric, MetricConfig, MetricKind, MetricSet, TOLERANCE, TextMetric};
pub use rouge_n::RougeN;
pub use rouge_w::RougeW;
pub use tfidf_rouge::TfIdfRougeN;
