//! Named regex registry for citation grammar and statute structure.
//!
//! Static patterns are compiled once. Patterns that embed a concrete
//! identifier are built per lookup by the `*_for` constructors, with the
//! identifier escaped so `139^1` is matched literally.

use std::sync::LazyLock;

use regex::Regex;

/// Article, paragraph or point identifier: digits, optional lowercase letter
/// suffix, optional `^`-delimited superscript (`6`, `43ba`, `479^66a`).
pub const ENTITY_ID: &str = r"\d+[a-z]*(?:\^\d+[a-z]*)?";

/// Fixed left indent (in columns) of a paragraph marker that continues an
/// article in layout-preserving extraction.
pub const PARAGRAPH_INDENT: usize = 11;

/// A compiled pattern with a stable name, so boundary rules can be listed and
/// tested one by one.
#[derive(Debug)]
pub struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl NamedPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("static pattern compiles"),
        }
    }
}

// ── Citation grammar ──

pub static ARTICLE_REF: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i:art)\.\s+({ENTITY_ID})")));

pub static PARAGRAPH_REF: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"§\s+({ENTITY_ID})")));

pub static POINT_REF: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i:pkt)\s+({ENTITY_ID})")));

/// Code abbreviation anchored at the end of the citation. The first branch
/// covers multi-word codes such as `k.r. i o.` / `k. r. i o.`.
pub static CODE_REF: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)((?:[a-z]+\.\s*)+i\s+[a-z]+\.|[a-z.]+)$"));

// ── Statute structure ──

/// `Art. 12a.` header that opens an article. Group 1 is the identifier.
pub static ARTICLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"Art\.\s+({ENTITY_ID})\.\s+")));

/// Headings that terminate an article span, nearest match wins.
pub static HEADING_BOUNDARIES: LazyLock<Vec<NamedPattern>> = LazyLock::new(|| {
    vec![
        NamedPattern::new("article", &format!(r"Art\.\s+{ENTITY_ID}\s*\.")),
        NamedPattern::new("chapter", r"(?:Rozdział|ROZDZIAŁ)\s+(?:[IVXLCDM]+\b|\d+[a-z]*)"),
        NamedPattern::new("section", r"Oddział\s+\d+[a-z]*"),
        NamedPattern::new("title", r"TYTUŁ\s+[IVXLCDM]+\b"),
        NamedPattern::new("part", r"DZIAŁ\s+[IVXLCDM]+\b"),
        NamedPattern::new("book", r"KSIĘGA\s+\p{Lu}+"),
    ]
});

/// Paragraph marker at the continuation indent, which ends the previous
/// paragraph.
pub static PARAGRAPH_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?m)^\s{{{PARAGRAPH_INDENT}}}\s*§\s+{ENTITY_ID}\."
    ))
});

/// Any point marker (`3)`, `2a)`), which ends the previous point.
pub static POINT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?m)(?:^|\s){ENTITY_ID}\)")));

/// Header of one specific article.
pub fn article_header_for(id: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"Art\.\s+{}\.\s+", regex::escape(id)))
}

/// Opening marker of one specific paragraph, either at the start of a line or
/// at the continuation indent.
pub fn paragraph_start_for(id: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?m)^(?:\s{{{PARAGRAPH_INDENT}}}\s*)?§\s+{}\.\s+",
        regex::escape(id)
    ))
}

/// Opening marker of one specific point.
pub fn point_start_for(id: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?m)(?:^|\s){}\)\s+", regex::escape(id)))
}

/// Byte offset of the nearest structural heading at or after `from`, or the
/// end of `text`.
pub fn next_heading(text: &str, from: usize) -> usize {
    HEADING_BOUNDARIES
        .iter()
        .filter_map(|p| p.regex.find_at(text, from))
        .map(|m| m.start())
        .min()
        .unwrap_or(text.len())
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}
