//! Parsing of Polish legal citations such as `art. 415 § 2 pkt 3 k.c.`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LexError;
use crate::patterns::{ARTICLE_REF, CODE_REF, PARAGRAPH_REF, POINT_REF};

/// A parsed citation. Identifiers keep their letter and `^` superscript
/// suffixes exactly as written; `code` keeps the abbreviation verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegalReference {
    pub article: String,
    pub paragraph: Option<String>,
    pub point: Option<String>,
    pub code: String,
}

impl LegalReference {
    /// Parse a citation string.
    ///
    /// Paragraph and point are found by independent searches, so both
    /// `pkt 1 § 2` and `§ 2 pkt 1` orderings are accepted. The code
    /// abbreviation must close the string.
    pub fn parse(citation: &str) -> Result<Self, LexError> {
        let citation = citation.trim();
        let invalid = || LexError::InvalidReference(citation.to_string());

        let article = capture(&ARTICLE_REF, citation).ok_or_else(invalid)?;
        let code = capture(&CODE_REF, citation).ok_or_else(invalid)?;

        Ok(Self {
            article,
            paragraph: capture(&PARAGRAPH_REF, citation),
            point: capture(&POINT_REF, citation),
            code,
        })
    }

    /// Lookup key of this reference's code in corpus and IDF indexes.
    pub fn code_key(&self) -> String {
        format_code_abbreviation(&self.code)
    }
}

impl FromStr for LegalReference {
    type Err = LexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LegalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "art. {}", self.article)?;
        if let Some(paragraph) = &self.paragraph {
            write!(f, " § {paragraph}")?;
        }
        if let Some(point) = &self.point {
            write!(f, " pkt {point}")?;
        }
        write!(f, " {}", self.code)
    }
}

/// Normalise a code abbreviation into an index key: `k.r. i o.` → `krio`.
pub fn format_code_abbreviation(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn capture(re: &regex::Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(citation: &str) -> LegalReference {
        LegalReference::parse(citation).unwrap()
    }

    #[test]
    fn article_only() {
        let r = parsed("art. 12 k.k.");
        assert_eq!(r.article, "12");
        assert_eq!(r.paragraph, None);
        assert_eq!(r.point, None);
        assert_eq!(r.code, "k.k.");
    }

    #[test]
    fn article_and_paragraph() {
        assert_eq!(
            parsed("art. 6 § 2 k.k."),
            LegalReference {
                article: "6".into(),
                paragraph: Some("2".into()),
                point: None,
                code: "k.k.".into(),
            }
        );
    }

    #[test]
    fn point_before_paragraph() {
        assert_eq!(
            parsed("art. 15 pkt 1 § 2 k.p."),
            LegalReference {
                article: "15".into(),
                paragraph: Some("2".into()),
                point: Some("1".into()),
                code: "k.p.".into(),
            }
        );
    }

    #[test]
    fn paragraph_before_point() {
        let r = parsed("art. 15 § 2 pkt 1 k.p.");
        assert_eq!(r.paragraph.as_deref(), Some("2"));
        assert_eq!(r.point.as_deref(), Some("1"));
    }

    #[test]
    fn article_with_point_only() {
        let r = parsed("art. 9 pkt 1 k.p.");
        assert_eq!(r.paragraph, None);
        assert_eq!(r.point.as_deref(), Some("1"));
    }

    #[test]
    fn letter_suffixes_round_trip() {
        let r = parsed("art. 6a § 2b pkt 3c k.k.");
        assert_eq!(r.article, "6a");
        assert_eq!(r.paragraph.as_deref(), Some("2b"));
        assert_eq!(r.point.as_deref(), Some("3c"));
    }

    #[test]
    fn superscript_suffixes_round_trip() {
        let r = parsed("art. 139^1 § 1^1 k.p.c.");
        assert_eq!(r.article, "139^1");
        assert_eq!(r.paragraph.as_deref(), Some("1^1"));
        assert_eq!(r.code, "k.p.c.");
    }

    #[test]
    fn multi_word_code_is_verbatim() {
        assert_eq!(parsed("art. 10 § 1 k.r. i o.").code, "k.r. i o.");
        assert_eq!(parsed("art. 10 § 1 k. r. i o.").code, "k. r. i o.");
    }

    #[test]
    fn code_is_case_insensitive() {
        assert_eq!(parsed("Art. 1 K.C.").code, "K.C.");
    }

    #[test]
    fn common_codes() {
        for code in [
            "k.c.", "k.p.c.", "k.k.", "k.p.k.", "k.p.", "k.p.a.", "k.s.h.", "k.w.", "k.k.s.",
        ] {
            assert_eq!(parsed(&format!("art. 1 {code}")).code, code);
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parsed("  art. 7 k.c.  \n").code, "k.c.");
    }

    #[test]
    fn missing_article_is_invalid() {
        assert!(matches!(
            LegalReference::parse("§ 2 k.k."),
            Err(LexError::InvalidReference(_))
        ));
    }

    #[test]
    fn missing_code_is_invalid() {
        assert!(matches!(
            LegalReference::parse("art. 6 § 2"),
            Err(LexError::InvalidReference(_))
        ));
        assert!(LegalReference::parse("").is_err());
    }

    #[test]
    fn display_renders_canonical_citation() {
        assert_eq!(parsed("art. 15 pkt 1 § 2 k.p.").to_string(), "art. 15 § 2 pkt 1 k.p.");
        assert_eq!(parsed("art. 10 k.r. i o.").to_string(), "art. 10 k.r. i o.");
    }

    #[test]
    fn from_str_matches_parse() {
        let r: LegalReference = "art. 415 § 1 k.c.".parse().unwrap();
        assert_eq!(r, parsed("art. 415 § 1 k.c."));
    }

    #[test]
    fn code_abbreviation_keys() {
        for (input, expected) in [
            ("k.k.", "kk"),
            ("k.p.c.", "kpc"),
            ("k.r. i o.", "krio"),
            ("k. r. i o.", "krio"),
            ("K.P.C.", "kpc"),
            ("k . k .", "kk"),
            ("kk", "kk"),
        ] {
            assert_eq!(format_code_abbreviation(input), expected);
        }
        assert_eq!(parsed("art. 10 k. r. i o.").code_key(), "krio");
    }
}
