//! Ground-truth extraction: resolving an answer key's legal basis to the
//! statute text it cites, and joining exam questions with their answers.

use std::collections::{BTreeMap, HashMap};

use lexbench_core::LegalReference;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{CorpusIndex, SkipList, StoreError};

/// One exam question as extracted from the question sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(alias = "text")]
    pub question: String,
    /// Option letter → option text.
    #[serde(default)]
    pub choices: BTreeMap<String, String>,
}

/// One row of the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: u32,
    pub answer: String,
    pub legal_basis: String,
}

/// Which exam a batch belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamInfo {
    pub exam_type: String,
    pub year: u16,
}

/// A question enriched with its correct answer and the quoted legal basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    pub id: u32,
    pub year: u16,
    pub exam_type: String,
    pub question: String,
    pub choices: BTreeMap<String, String>,
    pub answer: String,
    pub legal_basis: String,
    pub legal_basis_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub question_id: u32,
    pub legal_basis: String,
    pub reason: String,
}

/// Outcome of enriching one exam.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichReport {
    pub records: Vec<ExamRecord>,
    pub skipped: Vec<SkippedRecord>,
    /// Questions with no row in the answer key.
    pub unanswered: Vec<u32>,
}

/// Resolves citations against one year's corpus, honouring a skip list.
#[derive(Debug, Clone, Copy)]
pub struct LegalBasisResolver<'a> {
    corpus: &'a CorpusIndex,
    skip: &'a SkipList,
}

impl<'a> LegalBasisResolver<'a> {
    pub fn new(corpus: &'a CorpusIndex, skip: &'a SkipList) -> Self {
        Self { corpus, skip }
    }

    /// Parse a citation and quote the span it cites.
    ///
    /// Fails with [`StoreError::Skipped`] for skip-listed provisions; parse,
    /// corpus and locator failures propagate unchanged.
    pub fn resolve(&self, citation: &str) -> Result<String, StoreError> {
        let reference = LegalReference::parse(citation)?;
        self.resolve_reference(&reference)
    }

    pub fn resolve_reference(&self, reference: &LegalReference) -> Result<String, StoreError> {
        if self.skip.is_skipped(reference) {
            return Err(StoreError::Skipped(reference.to_string()));
        }
        self.corpus.locate(reference)
    }

    /// Join questions with answers by question id and resolve each legal
    /// basis. Failures are logged and reported, never fatal.
    pub fn enrich(
        &self,
        questions: &[Question],
        answers: &[Answer],
        exam: &ExamInfo,
    ) -> EnrichReport {
        let by_question: HashMap<u32, &Answer> =
            answers.iter().map(|a| (a.question_id, a)).collect();
        let mut report = EnrichReport::default();

        for question in questions {
            let Some(answer) = by_question.get(&question.id) else {
                report.unanswered.push(question.id);
                continue;
            };

            match self.resolve(&answer.legal_basis) {
                Ok(content) => report.records.push(ExamRecord {
                    id: question.id,
                    year: exam.year,
                    exam_type: exam.exam_type.clone(),
                    question: question.question.clone(),
                    choices: question.choices.clone(),
                    answer: answer.answer.clone(),
                    legal_basis: answer.legal_basis.clone(),
                    legal_basis_content: content,
                }),
                Err(e) => {
                    warn!(
                        question = question.id,
                        legal_basis = %answer.legal_basis,
                        error = %e,
                        "skipping question"
                    );
                    report.skipped.push(SkippedRecord {
                        question_id: question.id,
                        legal_basis: answer.legal_basis.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            exam_type = %exam.exam_type,
            year = exam.year,
            records = report.records.len(),
            skipped = report.skipped.len(),
            unanswered = report.unanswered.len(),
            "enriched exam"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CorpusText;

    const KPC: &str = "\
Art. 1. Kodeks postępowania cywilnego normuje postępowanie sądowe.
Art. 139^1. § 1. Jeżeli pozwany nie mieszka w miejscu doręczenia, pismo
pozostawia się w aktach sprawy.
           § 1^1. Przepisu nie stosuje się do nakazu zapłaty.
Art. 505^1. Sprawy rozpoznaje się w postępowaniu uproszczonym.
";

    fn corpus() -> CorpusIndex {
        let mut index = CorpusIndex::new(Some("2024".into()));
        index.insert("k.p.c.", CorpusText::Full(KPC.into()));
        index
    }

    fn question(id: u32) -> Question {
        Question {
            id,
            question: format!("Pytanie {id}"),
            choices: BTreeMap::from([
                ("A".to_string(), "tak".to_string()),
                ("B".to_string(), "nie".to_string()),
            ]),
        }
    }

    fn answer(id: u32, legal_basis: &str) -> Answer {
        Answer {
            question_id: id,
            answer: "A".into(),
            legal_basis: legal_basis.into(),
        }
    }

    fn exam() -> ExamInfo {
        ExamInfo {
            exam_type: "radcowski".into(),
            year: 2024,
        }
    }

    #[test]
    fn resolves_superscript_references() {
        let corpus = corpus();
        let skip = SkipList::default();
        let resolver = LegalBasisResolver::new(&corpus, &skip);
        assert_eq!(
            resolver.resolve("art. 139^1 § 1^1 k.p.c.").unwrap(),
            "Przepisu nie stosuje się do nakazu zapłaty."
        );
        assert_eq!(
            resolver.resolve("art. 505^1 k.p.c.").unwrap(),
            "Sprawy rozpoznaje się w postępowaniu uproszczonym."
        );
    }

    #[test]
    fn skip_listed_reference_is_refused() {
        let corpus = corpus();
        let skip = SkipList::from_json(r#"{"kpc": [{"article": "505^1"}]}"#).unwrap();
        let resolver = LegalBasisResolver::new(&corpus, &skip);
        assert!(matches!(
            resolver.resolve("art. 505^1 k.p.c."),
            Err(StoreError::Skipped(r)) if r == "art. 505^1 k.p.c."
        ));
    }

    #[test]
    fn failures_propagate_from_single_lookup() {
        let corpus = corpus();
        let skip = SkipList::default();
        let resolver = LegalBasisResolver::new(&corpus, &skip);
        assert!(matches!(resolver.resolve("bez podstawy"), Err(StoreError::Lex(_))));
        assert!(matches!(
            resolver.resolve("art. 1 k.c."),
            Err(StoreError::CorpusNotFound(_))
        ));
        assert!(matches!(resolver.resolve("art. 2 k.p.c."), Err(StoreError::Lex(_))));
    }

    #[test]
    fn enrich_skips_and_continues() {
        let corpus = corpus();
        let skip = SkipList::default();
        let resolver = LegalBasisResolver::new(&corpus, &skip);

        let questions = [question(1), question(2), question(3), question(4)];
        let answers = [
            answer(1, "art. 1 k.p.c."),
            answer(2, "art. 999 k.p.c."),
            answer(4, "art. 139^1 § 1 k.p.c."),
        ];
        let report = resolver.enrich(&questions, &answers, &exam());

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].id, 1);
        assert_eq!(
            report.records[0].legal_basis_content,
            "Kodeks postępowania cywilnego normuje postępowanie sądowe."
        );
        assert_eq!(
            report.records[1].legal_basis_content,
            "Jeżeli pozwany nie mieszka w miejscu doręczenia, pismo pozostawia się w aktach sprawy."
        );
        assert_eq!(report.records[1].exam_type, "radcowski");
        assert_eq!(report.records[1].choices.len(), 2);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].question_id, 2);
        assert!(report.skipped[0].reason.contains("999"));
        assert_eq!(report.unanswered, vec![3]);
    }

    #[test]
    fn question_accepts_text_alias() {
        let q: Question = serde_json::from_str(r#"{"id": 7, "text": "Treść"}"#).unwrap();
        assert_eq!(q.question, "Treść");
        assert!(q.choices.is_empty());
    }
}
