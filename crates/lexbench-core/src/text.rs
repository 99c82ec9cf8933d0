//! Text normalisation shared by every metric and by IDF indexing, plus reflow
//! of statute text extracted from PDFs.

/// Marks a superscript identifier suffix (`139^1`). Kept by [`normalize`].
pub const SUPERSCRIPT_MARKER: char = '^';

/// Line-wrap hyphen left in extracted text.
const HYPHEN: char = '-';

/// Split text into lowercase tokens with ASCII punctuation removed.
///
/// The superscript marker is not treated as punctuation, so `139^1` stays a
/// single token. Newlines count as whitespace.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .filter(|&c| !is_stripped_punctuation(c))
        .collect();
    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

fn is_stripped_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() && c != SUPERSCRIPT_MARKER
}

/// Rejoin wrapped lines of extracted text into a single line.
///
/// A line ending in a hyphen is glued to the next line without a space and
/// the hyphen is dropped; other lines are joined with one space. Runs of
/// whitespace collapse and the result is trimmed. Applying `reflow` to its own
/// output returns it unchanged.
pub fn reflow(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let mut joined = String::with_capacity(text.len());

    for (i, line) in lines.iter().enumerate() {
        let has_next = i + 1 < lines.len();
        match line.strip_suffix(HYPHEN) {
            Some(head) if has_next => joined.push_str(head),
            _ => {
                joined.push_str(line);
                if has_next {
                    joined.push(' ');
                }
            }
        }
    }

    collapse_whitespace(&joined)
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
