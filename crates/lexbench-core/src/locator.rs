//! Hierarchical location of article, paragraph and point spans in statute
//! text, plus splitting a full statute into its articles.
//!
//! Every span handed back as a quotation passes through [`reflow`]. The raw
//! accessors ([`find_article`], [`split_articles`]) keep the original line
//! layout, which paragraph lookup depends on.

use std::collections::HashSet;

use tracing::debug;

use crate::patterns::{
    self, ARTICLE_HEADER, PARAGRAPH_CONTINUATION, POINT_MARKER, next_heading,
};
use crate::text::reflow;
use crate::{LegalReference, LexError};

/// Raw body of article `id` in a full statute: from after its first
/// `Art. {id}.` header to the nearest following heading or the end of the
/// text. This is the same body [`split_articles`] keeps for `id`.
pub fn find_article<'t>(text: &'t str, id: &str) -> Result<&'t str, LexError> {
    let header = patterns::article_header_for(id)?
        .find(text)
        .ok_or_else(|| LexError::ArticleNotFound {
            article: id.to_string(),
        })?;
    let end = next_heading(text, header.end());
    Ok(&text[header.end()..end])
}

/// Reflowed body of article `id` in a full statute.
pub fn get_article(text: &str, id: &str) -> Result<String, LexError> {
    find_article(text, id).map(reflow)
}

/// Reflowed content of paragraph `id` (`§ {id}.`) within an article body.
///
/// The marker is accepted at the start of a line or at the continuation
/// indent. The paragraph runs until the next paragraph marker at the
/// continuation indent or the end of the article.
pub fn get_paragraph(article_text: &str, id: &str) -> Result<String, LexError> {
    let start = patterns::paragraph_start_for(id)?
        .find(article_text)
        .ok_or_else(|| LexError::ParagraphNotFound {
            paragraph: id.to_string(),
        })?;
    let body_start = start.end();
    let end = PARAGRAPH_CONTINUATION
        .find_at(article_text, first_char_end(article_text, body_start))
        .map_or(article_text.len(), |m| m.start());
    Ok(reflow(&article_text[body_start..end]))
}

/// Reflowed content of point `id` (`{id})`) within an article or paragraph,
/// ending at the next point marker.
pub fn get_point(text: &str, id: &str) -> Result<String, LexError> {
    let start = patterns::point_start_for(id)?
        .find(text)
        .ok_or_else(|| LexError::PointNotFound {
            point: id.to_string(),
        })?;
    let body_start = start.end();
    let end = POINT_MARKER
        .find_at(text, first_char_end(text, body_start))
        .map_or(text.len(), |m| m.start());
    Ok(reflow(&text[body_start..end]))
}

/// Quote the span a reference points at, given the raw body of its article.
///
/// A point is searched inside the paragraph when the reference names one,
/// otherwise inside the whole article.
pub fn locate(article_text: &str, reference: &LegalReference) -> Result<String, LexError> {
    debug!(reference = %reference, "locating span");
    match (&reference.paragraph, &reference.point) {
        (Some(paragraph), Some(point)) => {
            let paragraph_text = get_paragraph(article_text, paragraph)?;
            get_point(&paragraph_text, point)
        }
        (None, Some(point)) => get_point(article_text, point),
        (Some(paragraph), None) => get_paragraph(article_text, paragraph),
        (None, None) => Ok(reflow(article_text)),
    }
}

/// Quote the span a reference points at inside a full statute.
pub fn locate_in_statute(text: &str, reference: &LegalReference) -> Result<String, LexError> {
    let article = find_article(text, &reference.article)?;
    locate(article, reference)
}

/// Split a full statute into `(article id, raw body)` pairs in document order.
///
/// A repeated identifier keeps its first occurrence; later bodies are ignored.
pub fn split_articles(text: &str) -> Vec<(String, String)> {
    let mut articles: Vec<(String, String)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pos = 0;

    while let Some(caps) = ARTICLE_HEADER.captures_at(text, pos) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let end = next_heading(text, whole.end());
        let body = text[whole.end()..end].to_string();
        let id = id.as_str().to_string();

        if seen.insert(id.clone()) {
            articles.push((id, body));
        } else {
            debug!(article = %id, "ignoring repeated article header");
        }
        pos = end.max(whole.end());
    }

    debug!(count = articles.len(), "split statute into articles");
    articles
}

/// Offset just past the character at `i`, so a span always keeps at least one
/// character before a terminator can match.
fn first_char_end(text: &str, i: usize) -> usize {
    text[i..].chars().next().map_or(i, |c| i + c.len_utf8())
}
