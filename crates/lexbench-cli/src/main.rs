mod response;
mod score;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexbench_core::{LegalReference, split_articles};
use lexbench_metrics::{IdfTable, MetricConfig, MetricSet};
use lexbench_store::{
    Answer, CorpusIndex, ExamInfo, IdfCache, LegalBasisResolver, Question, SkipList,
};
use serde_json::{Map, Value};

use crate::score::{Scorer, write_jsonl};

#[derive(Parser)]
#[command(name = "lexbench", version)]
#[command(about = "Ground-truth extraction and scoring for legal exam benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a full statute text into a JSON article mapping
    Split {
        /// Extracted statute text
        input: PathBuf,

        /// Write the mapping here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Quote the statute text cited by one or more references
    Resolve {
        /// Citations such as "art. 415 § 1 k.c."
        #[arg(required = true)]
        citations: Vec<String>,

        /// Corpus directory of one benchmark year
        #[arg(long, env = "LEXBENCH_CORPUS_DIR")]
        corpus_dir: PathBuf,

        /// JSON skip list of provisions to refuse
        #[arg(long)]
        skip_list: Option<PathBuf>,
    },

    /// Build the IDF cache for a corpus year
    Idf {
        #[arg(long, env = "LEXBENCH_CORPUS_DIR")]
        corpus_dir: PathBuf,

        /// Cache file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Rebuild even if the cache file exists
        #[arg(short, long)]
        force: bool,
    },

    /// Join questions with answer keys and quote each legal basis
    Enrich {
        /// JSON array of questions
        #[arg(long)]
        questions: PathBuf,

        /// JSON array of answer key rows
        #[arg(long)]
        answers: PathBuf,

        #[arg(long)]
        exam_type: String,

        #[arg(long)]
        year: u16,

        #[arg(long, env = "LEXBENCH_CORPUS_DIR")]
        corpus_dir: PathBuf,

        #[arg(long)]
        skip_list: Option<PathBuf>,

        /// JSONL file of enriched records
        #[arg(short, long)]
        output: PathBuf,

        /// JSONL file of skipped records
        #[arg(long)]
        skipped: Option<PathBuf>,
    },

    /// Add accuracy and text metrics to benchmark result files
    Score {
        /// Directory of *.jsonl result files
        input_dir: PathBuf,

        /// Directory for scored files, mirroring the input layout
        output_dir: PathBuf,

        /// Corpus directory, used to build IDF tables when no cache is given
        #[arg(long, env = "LEXBENCH_CORPUS_DIR")]
        corpus_dir: Option<PathBuf>,

        /// IDF cache built by `lexbench idf`
        #[arg(long)]
        idf_cache: Option<PathBuf>,

        /// JSON metric configuration
        #[arg(long, env = "LEXBENCH_METRICS_CONFIG")]
        metrics_config: Option<PathBuf>,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Split { input, output } => cmd_split(&input, output.as_deref()),
        Commands::Resolve {
            citations,
            corpus_dir,
            skip_list,
        } => cmd_resolve(&citations, &corpus_dir, skip_list.as_deref()),
        Commands::Idf {
            corpus_dir,
            output,
            force,
        } => cmd_idf(&corpus_dir, &output, force),
        Commands::Enrich {
            questions,
            answers,
            exam_type,
            year,
            corpus_dir,
            skip_list,
            output,
            skipped,
        } => {
            let exam = ExamInfo { exam_type, year };
            cmd_enrich(
                &questions,
                &answers,
                &exam,
                &corpus_dir,
                skip_list.as_deref(),
                &output,
                skipped.as_deref(),
            )
        }
        Commands::Score {
            input_dir,
            output_dir,
            corpus_dir,
            idf_cache,
            metrics_config,
            force,
        } => cmd_score(
            &input_dir,
            &output_dir,
            corpus_dir.as_deref(),
            idf_cache.as_deref(),
            metrics_config.as_deref(),
            force,
        ),
    }
}

// ── Commands ──

/// Bodies keep their line layout; paragraph lookup depends on it.
fn cmd_split(input: &Path, output: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let articles = split_articles(&text);
    eprintln!("Found {} articles in {}", articles.len(), input.display());

    let mapping: Map<String, Value> = articles
        .into_iter()
        .map(|(id, body)| (id, Value::String(body)))
        .collect();
    let json = serde_json::to_string_pretty(&mapping)?;

    match output {
        Some(path) => fs::write(path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_resolve(citations: &[String], corpus_dir: &Path, skip_list: Option<&Path>) -> Result<()> {
    let corpus = CorpusIndex::load_dir(corpus_dir)?;
    let skip = load_skip_list(skip_list)?;
    let resolver = LegalBasisResolver::new(&corpus, &skip);

    let mut failures = 0usize;
    for citation in citations {
        match LegalReference::parse(citation) {
            Ok(reference) => match resolver.resolve_reference(&reference) {
                Ok(text) => println!("{reference}\n  {text}"),
                Err(e) => {
                    eprintln!("{reference}: {e}");
                    failures += 1;
                }
            },
            Err(e) => {
                eprintln!("{e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} citation(s) could not be resolved", citations.len());
    }
    Ok(())
}

fn cmd_idf(corpus_dir: &Path, output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        eprintln!("{} exists, use --force to rebuild", output.display());
        return Ok(());
    }
    let corpus = CorpusIndex::load_dir(corpus_dir)?;
    let cache = IdfCache::build(&corpus);
    cache.save(output)?;
    eprintln!(
        "Built IDF tables for {} code(s): {}",
        cache.table.len(),
        cache.table.codes().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

fn cmd_enrich(
    questions: &Path,
    answers: &Path,
    exam: &ExamInfo,
    corpus_dir: &Path,
    skip_list: Option<&Path>,
    output: &Path,
    skipped: Option<&Path>,
) -> Result<()> {
    let questions: Vec<Question> = read_json(questions)?;
    let answers: Vec<Answer> = read_json(answers)?;
    let corpus = CorpusIndex::load_dir(corpus_dir)?;
    let skip = load_skip_list(skip_list)?;

    let report = LegalBasisResolver::new(&corpus, &skip).enrich(&questions, &answers, exam);
    write_jsonl(output, &report.records)?;
    if let Some(path) = skipped {
        write_jsonl(path, &report.skipped)?;
    }

    eprintln!(
        "Enriched {} of {} question(s): {} skipped, {} without answer",
        report.records.len(),
        questions.len(),
        report.skipped.len(),
        report.unanswered.len()
    );
    Ok(())
}

fn cmd_score(
    input_dir: &Path,
    output_dir: &Path,
    corpus_dir: Option<&Path>,
    idf_cache: Option<&Path>,
    metrics_config: Option<&Path>,
    force: bool,
) -> Result<()> {
    let config: MetricConfig = match metrics_config {
        Some(path) => read_json(path)?,
        None => MetricConfig::default(),
    };

    let idf = if config.needs_idf() {
        Some(Arc::new(load_idf(corpus_dir, idf_cache)?))
    } else {
        None
    };
    let metrics = MetricSet::from_config(&config, idf.as_ref())?;
    eprintln!("Metrics: {}", metrics.names().collect::<Vec<_>>().join(", "));

    let stats = Scorer::new(metrics).score_dir(input_dir, output_dir, force)?;
    eprintln!(
        "Done: scored {} of {} file(s) ({} entries), skipped {}",
        stats.processed, stats.files, stats.entries, stats.skipped
    );
    Ok(())
}

// ── Helpers ──

fn load_idf(corpus_dir: Option<&Path>, idf_cache: Option<&Path>) -> Result<IdfTable> {
    match (idf_cache, corpus_dir) {
        (Some(cache), Some(corpus_dir)) => {
            let corpus = CorpusIndex::load_dir(corpus_dir)?;
            Ok(IdfCache::load_or_build(cache, &corpus)?.table)
        }
        (Some(cache), None) => Ok(IdfCache::load(cache)?.table),
        (None, Some(corpus_dir)) => Ok(CorpusIndex::load_dir(corpus_dir)?.idf_table()),
        (None, None) => anyhow::bail!(
            "weighted metrics need IDF tables: pass --idf-cache or --corpus-dir"
        ),
    }
}

fn load_skip_list(path: Option<&Path>) -> Result<SkipList> {
    match path {
        Some(path) => Ok(SkipList::load(path)?),
        None => Ok(SkipList::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
