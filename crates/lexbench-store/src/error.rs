use std::path::PathBuf;

use lexbench_core::LexError;
use lexbench_metrics::MetricError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corpus directory not found: {0}")]
    CorpusDirNotFound(PathBuf),

    #[error("no corpus loaded for code {0:?}")]
    CorpusNotFound(String),

    /// The reference is listed in the skip list for its code.
    #[error("{0} is on the skip list")]
    Skipped(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Metric(#[from] MetricError),
}
