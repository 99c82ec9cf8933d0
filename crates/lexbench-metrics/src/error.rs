use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricError {
    /// A reference token has no IDF weight: the corpus year does not match the
    /// exam the reference was taken from.
    #[error("token {token:?} not found in IDF table for code {code:?}")]
    UnknownToken { token: String, code: String },

    #[error("no IDF table for code {0:?}")]
    UnknownCode(String),

    #[error("metric {metric} requires a code abbreviation")]
    MissingCode { metric: &'static str },

    #[error("predictions and references differ in length: {predictions} vs {references}")]
    LengthMismatch {
        predictions: usize,
        references: usize,
    },

    #[error("metric {metric} produced {value}, outside [0, 1]")]
    OutOfRange { metric: &'static str, value: f64 },

    #[error("invalid metric configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown metric {0:?}")]
    UnknownMetric(String),
}
