//! IDF tables persisted as JSON so scoring runs do not re-read the corpus.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use lexbench_metrics::IdfTable;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CorpusIndex, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdfCache {
    pub built_at: DateTime<Utc>,
    /// Corpus year the table was built from.
    #[serde(default)]
    pub year: Option<String>,
    pub table: IdfTable,
}

impl IdfCache {
    pub fn build(corpus: &CorpusIndex) -> Self {
        Self {
            built_at: Utc::now(),
            year: corpus.year().map(str::to_string),
            table: corpus.idf_table(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec(self)?)?;
        info!(path = %path.display(), codes = self.table.len(), "saved IDF cache");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let cache: Self = serde_json::from_slice(&fs::read(path)?)?;
        info!(
            path = %path.display(),
            codes = cache.table.len(),
            built_at = %cache.built_at,
            "loaded IDF cache"
        );
        Ok(cache)
    }

    /// Load the cache at `path`, or build it from the corpus and save it there.
    pub fn load_or_build(path: &Path, corpus: &CorpusIndex) -> Result<Self, StoreError> {
        if path.exists() {
            return Self::load(path);
        }
        let cache = Self::build(corpus);
        cache.save(path)?;
        Ok(cache)
    }
}
