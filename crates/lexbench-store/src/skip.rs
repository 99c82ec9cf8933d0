//! Provisions excluded from ground-truth extraction, per code.
//!
//! Skip lists are JSON objects mapping a code to filters:
//!
//! ```json
//! { "kpc": [ { "article": "479^57", "point": "2" }, { "article": "505^1" } ] }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lexbench_core::{LegalReference, format_code_abbreviation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::StoreError;

/// Matches references to one article, optionally narrowed to a paragraph
/// and point. An unset level matches any value, including none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    pub article: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
}

impl ArticleFilter {
    pub fn matches(&self, reference: &LegalReference) -> bool {
        fn level(filter: &Option<String>, value: &Option<String>) -> bool {
            filter.is_none() || filter == value
        }
        self.article == reference.article
            && level(&self.paragraph, &reference.paragraph)
            && level(&self.point, &reference.point)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    codes: BTreeMap<String, Vec<ArticleFilter>>,
}

impl SkipList {
    /// Build from a code → filters map; codes may be in any spelling.
    pub fn new(codes: BTreeMap<String, Vec<ArticleFilter>>) -> Self {
        let mut merged: BTreeMap<String, Vec<ArticleFilter>> = BTreeMap::new();
        for (code, filters) in codes {
            merged
                .entry(format_code_abbreviation(&code))
                .or_default()
                .extend(filters);
        }
        Self { codes: merged }
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let list = Self::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), filters = list.len(), "loaded skip list");
        Ok(list)
    }

    /// Total number of filters across codes.
    pub fn len(&self) -> usize {
        self.codes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_skipped(&self, reference: &LegalReference) -> bool {
        self.codes
            .get(&reference.code_key())
            .is_some_and(|filters| filters.iter().any(|f| f.matches(reference)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(citation: &str) -> LegalReference {
        LegalReference::parse(citation).unwrap()
    }

    fn list() -> SkipList {
        SkipList::from_json(
            r#"{
                "k.p.c.": [
                    {"article": "477^8", "paragraph": "2", "point": "4b"},
                    {"article": "479^57", "point": "2"}
                ],
                "kks": [{"article": "31"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn unset_levels_match_anything() {
        let list = list();
        assert!(list.is_skipped(&reference("art. 31 k.k.s.")));
        assert!(list.is_skipped(&reference("art. 31 § 6 k.k.s.")));
        assert!(list.is_skipped(&reference("art. 479^57 § 1 pkt 2 k.p.c.")));
        assert!(list.is_skipped(&reference("art. 479^57 pkt 2 k.p.c.")));
    }

    #[test]
    fn set_levels_must_match() {
        let list = list();
        assert!(list.is_skipped(&reference("art. 477^8 § 2 pkt 4b k.p.c.")));
        assert!(!list.is_skipped(&reference("art. 477^8 § 2 pkt 4 k.p.c.")));
        assert!(!list.is_skipped(&reference("art. 477^8 § 2 k.p.c.")));
        assert!(!list.is_skipped(&reference("art. 479^57 k.p.c.")));
    }

    #[test]
    fn other_codes_and_articles_pass() {
        let list = list();
        assert!(!list.is_skipped(&reference("art. 31 k.k.")));
        assert!(!list.is_skipped(&reference("art. 310 k.k.s.")));
    }

    #[test]
    fn counts_filters() {
        assert_eq!(list().len(), 3);
        assert!(SkipList::default().is_empty());
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), r#"{"kc": [{"article": "415"}]}"#).unwrap();
        let list = SkipList::load(tmp.path()).unwrap();
        assert!(list.is_skipped(&reference("art. 415 k.c.")));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            SkipList::from_json(r#"{"kc": [{"paragraph": "1"}]}"#),
            Err(StoreError::Json(_))
        ));
    }
}
