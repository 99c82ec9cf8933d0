//! Per-year corpus of extracted legal-code text.
//!
//! A corpus directory holds one file per code: `<code>.json` with either an
//! article-id → text object or a single full-text string, or `<code>.txt`
//! with the full text. File stems are normalised into lookup keys, so
//! `k.k.json`, `kk.json` and `KK.txt` all load as `kk`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lexbench_core::{
    LegalReference, LexError, find_article, format_code_abbreviation, locate, split_articles,
};
use lexbench_metrics::IdfTable;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::StoreError;

/// Extracted text of one legal code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorpusText {
    /// Article id → raw article body.
    Articles(BTreeMap<String, String>),
    /// The whole statute; articles are found by their headers.
    Full(String),
}

impl CorpusText {
    /// Raw body of an article, line layout intact.
    pub fn article(&self, id: &str) -> Result<&str, LexError> {
        match self {
            CorpusText::Full(text) => find_article(text, id),
            CorpusText::Articles(articles) => articles
                .get(id)
                .map(String::as_str)
                .ok_or_else(|| LexError::ArticleNotFound {
                    article: id.to_string(),
                }),
        }
    }

    /// Reflowed span the reference points at.
    pub fn locate(&self, reference: &LegalReference) -> Result<String, LexError> {
        locate(self.article(&reference.article)?, reference)
    }

    /// Every article body in document order.
    pub fn articles(&self) -> Vec<String> {
        match self {
            CorpusText::Full(text) => split_articles(text)
                .into_iter()
                .map(|(_, body)| body)
                .collect(),
            CorpusText::Articles(articles) => articles.values().cloned().collect(),
        }
    }
}

/// All codes of one benchmark year, keyed by normalised abbreviation.
///
/// Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    year: Option<String>,
    codes: BTreeMap<String, CorpusText>,
}

impl CorpusIndex {
    pub fn new(year: Option<String>) -> Self {
        Self {
            year,
            codes: BTreeMap::new(),
        }
    }

    /// Load every `.json` and `.txt` file in `dir`. The directory name is
    /// taken as the corpus year.
    pub fn load_dir(dir: &Path) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::CorpusDirNotFound(dir.to_path_buf()));
        }
        let year = dir.file_name().map(|name| name.to_string_lossy().into_owned());
        let mut index = Self::new(year);

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text: CorpusText = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => serde_json::from_str(&fs::read_to_string(&path)?)?,
                Some("txt") => CorpusText::Full(fs::read_to_string(&path)?),
                _ => {
                    debug!(path = %path.display(), "ignoring non-corpus file");
                    continue;
                }
            };
            index.insert(stem, text);
        }

        info!(
            dir = %dir.display(),
            codes = index.codes.len(),
            "loaded corpus"
        );
        Ok(index)
    }

    /// Add or replace a code's text.
    pub fn insert(&mut self, code: &str, text: CorpusText) {
        let key = format_code_abbreviation(code);
        match &text {
            CorpusText::Full(full) => info!(code = %key, bytes = full.len(), "indexed code"),
            CorpusText::Articles(articles) => {
                info!(code = %key, articles = articles.len(), "indexed code")
            }
        }
        self.codes.insert(key, text);
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Text of a code in any spelling (`k.k.`, `kk`).
    pub fn get(&self, code: &str) -> Result<&CorpusText, StoreError> {
        let key = format_code_abbreviation(code);
        self.codes.get(&key).ok_or(StoreError::CorpusNotFound(key))
    }

    pub fn article(&self, code: &str, id: &str) -> Result<&str, StoreError> {
        Ok(self.get(code)?.article(id)?)
    }

    pub fn locate(&self, reference: &LegalReference) -> Result<String, StoreError> {
        Ok(self.get(&reference.code)?.locate(reference)?)
    }

    /// IDF table over every code's articles.
    pub fn idf_table(&self) -> IdfTable {
        IdfTable::build(self.codes.iter().map(|(code, text)| (code, text.articles())))
    }
}
