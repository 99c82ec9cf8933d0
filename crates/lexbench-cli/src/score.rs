//! Scoring pipeline: adds `accuracy_metrics` and `text_metrics` to every
//! entry of benchmark result files.
//!
//! Input files are `*.jsonl` anywhere under the input directory; each is
//! written to the same relative path under the output directory.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use lexbench_core::LegalReference;
use lexbench_metrics::{ExactMatch, MetricError, MetricSet, TextMetric};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::response::extract_json_field;

type Entry = Map<String, Value>;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScoreStats {
    pub files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub entries: usize,
}

pub struct Scorer {
    metrics: MetricSet,
}

impl Scorer {
    pub fn new(metrics: MetricSet) -> Self {
        Self { metrics }
    }

    /// Score one result entry in place.
    ///
    /// Model fields missing from the entry are extracted from
    /// `model_response`, which is then dropped. A failing metric is recorded
    /// as 0.0 so the row stays complete, except [`MetricError::UnknownToken`]
    /// and [`MetricError::UnknownCode`]: both mean the IDF table was built
    /// from another corpus.
    pub fn score_entry(&self, entry: &mut Entry) -> Result<(), MetricError> {
        fill_from_response(entry, "model_answer", "answer");
        fill_from_response(entry, "model_legal_basis", "legal_basis");
        fill_from_response(entry, "model_legal_basis_content", "legal_basis_content");
        entry.remove("model_response");

        let mut accuracy = Map::new();
        if let (Some(model), Some(correct)) = (
            str_field(entry, "model_answer"),
            str_field(entry, "correct_answer"),
        ) {
            let score = ExactMatch.score(&model.to_lowercase(), &correct.to_lowercase(), None)?;
            accuracy.insert("answer".into(), score.into());
        }

        let mut text = Map::new();
        if let (Some(prediction), Some(reference)) = (
            str_field(entry, "model_legal_basis_content"),
            str_field(entry, "legal_basis_content"),
        ) {
            let code = str_field(entry, "legal_basis")
                .and_then(|basis| LegalReference::parse(basis).ok())
                .map(|reference| reference.code);

            for metric in self.metrics.metrics() {
                let score = match metric.score(prediction, reference, code.as_deref()) {
                    Ok(score) => score,
                    Err(
                        e @ (MetricError::UnknownToken { .. } | MetricError::UnknownCode(_)),
                    ) => return Err(e),
                    Err(e) => {
                        warn!(
                            metric = metric.name(),
                            id = %entry.get("id").unwrap_or(&serde_json::Value::Null),
                            error = %e,
                            "metric failed, recording 0"
                        );
                        0.0
                    }
                };
                text.insert(metric.name().into(), score.into());
            }
        }

        entry.insert("accuracy_metrics".into(), Value::Object(accuracy));
        entry.insert("text_metrics".into(), Value::Object(text));
        Ok(())
    }

    /// Score every entry of one JSONL file into `output`.
    pub fn score_file(&self, input: &Path, output: &Path) -> anyhow::Result<usize> {
        let mut entries = read_jsonl(input)?;
        for (line, entry) in entries.iter_mut().enumerate() {
            self.score_entry(entry)
                .with_context(|| format!("scoring {} entry {}", input.display(), line + 1))?;
        }
        write_jsonl(output, &entries)?;
        Ok(entries.len())
    }

    /// Score every `*.jsonl` file under `input_dir` into mirrored paths
    /// under `output_dir`. Existing outputs are kept unless `force`.
    pub fn score_dir(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force: bool,
    ) -> anyhow::Result<ScoreStats> {
        if !input_dir.is_dir() {
            anyhow::bail!("input directory {} does not exist", input_dir.display());
        }
        let files = find_jsonl_files(input_dir)?;
        let mut stats = ScoreStats {
            files: files.len(),
            ..ScoreStats::default()
        };
        eprintln!("Found {} JSONL file(s) in {}", files.len(), input_dir.display());

        for file in files {
            let relative = file
                .strip_prefix(input_dir)
                .context("result file outside input directory")?;
            let output = output_dir.join(relative);
            if output.exists() && !force {
                eprintln!(
                    "  Skipping {}: output exists (use --force to overwrite)",
                    relative.display()
                );
                stats.skipped += 1;
                continue;
            }
            let entries = self.score_file(&file, &output)?;
            eprintln!("  Scored {} ({entries} entries)", relative.display());
            stats.processed += 1;
            stats.entries += entries;
        }

        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            entries = stats.entries,
            "scoring complete"
        );
        Ok(stats)
    }
}

fn str_field<'e>(entry: &'e Entry, key: &str) -> Option<&'e str> {
    entry.get(key).and_then(Value::as_str)
}

fn fill_from_response(entry: &mut Entry, key: &str, field: &str) {
    if entry.contains_key(key) {
        return;
    }
    let Some(response) = str_field(entry, "model_response") else {
        return;
    };
    let mut value = extract_json_field(response, field).unwrap_or_default();
    if field == "answer" {
        value = value.to_uppercase();
    }
    entry.insert(key.into(), value.into());
}

/// Every `*.jsonl` file below `dir`, sorted.
pub fn find_jsonl_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "jsonl") {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

pub fn read_jsonl(path: &Path) -> anyhow::Result<Vec<Entry>> {
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut entries = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: Entry = serde_json::from_str(&line)
            .with_context(|| format!("parsing {} line {}", path.display(), i + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

pub fn write_jsonl<T: serde::Serialize>(path: &Path, entries: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for entry in entries {
        serde_json::to_writer(&mut out, entry)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lexbench_metrics::{IdfTable, MetricConfig, MetricKind};
    use serde_json::json;

    fn idf() -> Arc<IdfTable> {
        Arc::new(IdfTable::build([(
            "kk",
            vec![
                "Sąd może orzec zakaz prowadzenia pojazdów",
                "Kto zabija człowieka podlega karze",
                "Sąd może orzec nawiązkę",
            ],
        )]))
    }

    fn scorer(metrics: Vec<MetricKind>) -> Scorer {
        let config = MetricConfig {
            metrics,
            ..MetricConfig::default()
        };
        Scorer::new(MetricSet::from_config(&config, Some(&idf())).unwrap())
    }

    fn entry(value: Value) -> Entry {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn scores_complete_entry() {
        let scorer = scorer(MetricKind::ALL.to_vec());
        let mut e = entry(json!({
            "id": 1,
            "correct_answer": "B",
            "model_answer": "b",
            "legal_basis": "art. 42 § 1 k.k.",
            "legal_basis_content": "Sąd może orzec zakaz prowadzenia pojazdów",
            "model_legal_basis_content": "sąd może orzec zakaz prowadzenia pojazdów.",
            "model_response": "{}"
        }));
        scorer.score_entry(&mut e).unwrap();

        assert!(!e.contains_key("model_response"));
        assert_eq!(e["accuracy_metrics"]["answer"], json!(1.0));
        let text = e["text_metrics"].as_object().unwrap();
        assert_eq!(text.len(), 6);
        for (name, value) in text {
            let v = value.as_f64().unwrap();
            assert!((v - 1.0).abs() < 1e-9, "{name} = {v}");
        }
    }

    #[test]
    fn fills_missing_fields_from_response() {
        let scorer = scorer(vec![MetricKind::ExactMatch]);
        let mut e = entry(json!({
            "correct_answer": "C",
            "legal_basis": "art. 148 k.k.",
            "legal_basis_content": "Kto zabija człowieka podlega karze",
            "model_response": "```json\n{\"answer\": \"c\", \"legal_basis_content\": \"Kto zabija człowieka, podlega karze\"}\n```"
        }));
        scorer.score_entry(&mut e).unwrap();
        assert_eq!(e["model_answer"], json!("C"));
        assert_eq!(e["model_legal_basis"], json!(""));
        assert_eq!(e["accuracy_metrics"]["answer"], json!(1.0));
        assert_eq!(e["text_metrics"]["exact_match"], json!(1.0));
    }

    #[test]
    fn metric_failure_records_zero() {
        let scorer = scorer(vec![MetricKind::Bleu, MetricKind::WeightedBleu]);
        let mut e = entry(json!({
            "legal_basis": "bez podstawy",
            "legal_basis_content": "Sąd może orzec nawiązkę",
            "model_legal_basis_content": "Sąd może orzec nawiązkę"
        }));
        scorer.score_entry(&mut e).unwrap();
        assert_eq!(e["text_metrics"]["weighted_bleu"], json!(0.0));
        assert!(e["text_metrics"]["bleu"].as_f64().unwrap() > 0.0);
        assert_eq!(e["accuracy_metrics"], json!({}));
    }

    #[test]
    fn unknown_token_aborts() {
        let scorer = scorer(vec![MetricKind::TfIdfRougeN]);
        let mut e = entry(json!({
            "legal_basis": "art. 1 k.k.",
            "legal_basis_content": "przepis spoza korpusu",
            "model_legal_basis_content": "przepis"
        }));
        assert!(matches!(
            scorer.score_entry(&mut e),
            Err(MetricError::UnknownToken { .. })
        ));
    }

    #[test]
    fn code_missing_from_idf_aborts() {
        let scorer = scorer(vec![MetricKind::Bleu, MetricKind::WeightedBleu]);
        let mut e = entry(json!({
            "legal_basis": "art. 1 k.c.",
            "legal_basis_content": "Sąd może orzec nawiązkę",
            "model_legal_basis_content": "Sąd może orzec nawiązkę"
        }));
        assert!(matches!(
            scorer.score_entry(&mut e),
            Err(MetricError::UnknownCode(code)) if code == "kc"
        ));
    }

    #[test]
    fn empty_model_output_scores_zero() {
        let scorer = scorer(vec![MetricKind::ExactMatch, MetricKind::Bleu]);
        let mut e = entry(json!({
            "legal_basis_content": "zakaz prowadzenia pojazdów",
            "model_legal_basis_content": ""
        }));
        scorer.score_entry(&mut e).unwrap();
        assert_eq!(e["text_metrics"], json!({"exact_match": 0.0, "bleu": 0.0}));
    }

    #[test]
    fn scores_directory_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("results");
        let output = tmp.path().join("scored");
        let nested = input.join("model-a").join("2024");
        fs::create_dir_all(&nested).unwrap();

        let row = json!({
            "correct_answer": "A",
            "model_answer": "B",
            "legal_basis_content": "Sąd może orzec nawiązkę",
            "model_legal_basis_content": "Sąd może orzec nawiązkę"
        });
        fs::write(nested.join("radcowski.jsonl"), format!("{row}\n\n{row}\n")).unwrap();
        fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let scorer = scorer(vec![MetricKind::ExactMatch]);
        let stats = scorer.score_dir(&input, &output, false).unwrap();
        assert_eq!(
            stats,
            ScoreStats {
                files: 1,
                processed: 1,
                skipped: 0,
                entries: 2
            }
        );

        let written = read_jsonl(&output.join("model-a/2024/radcowski.jsonl")).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0]["accuracy_metrics"]["answer"], json!(0.0));
        assert_eq!(written[0]["text_metrics"]["exact_match"], json!(1.0));

        let again = scorer.score_dir(&input, &output, false).unwrap();
        assert_eq!(again.skipped, 1);
        let forced = scorer.score_dir(&input, &output, true).unwrap();
        assert_eq!(forced.processed, 1);
    }

    #[test]
    fn missing_input_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let scorer = scorer(vec![MetricKind::ExactMatch]);
        assert!(scorer.score_dir(&tmp.path().join("absent"), tmp.path(), false).is_err());
    }
}
