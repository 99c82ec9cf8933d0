//! Corpus storage and ground-truth extraction: per-year corpus directories,
//! legal-basis resolution with skip lists, and the IDF cache.

pub mod basis;
pub mod cache;
pub mod corpus;
mod error;
pub mod skip;

pub use basis::{
    Answer, EnrichReport, ExamInfo, ExamRecord, LegalBasisResolver, Question, SkippedRecord,
};
pub use cache::IdfCache;
pub use corpus::{CorpusIndex, CorpusText};
pub use error::StoreError;
pub use skip::{ArticleFilter, SkipList};
