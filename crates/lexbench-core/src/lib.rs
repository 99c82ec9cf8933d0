//! Core types for legal exam benchmarking: citation parsing, shared text
//! normalisation, and location of quoted spans in statute text.

mod error;
pub mod locator;
pub mod patterns;
pub mod reference;
pub mod text;

pub use error::LexError;
pub use locator::{
    find_article, get_article, get_paragraph, get_point, locate, locate_in_statute, split_articles,
};
pub use reference::{LegalReference, format_code_abbreviation};
pub use text::{SUPERSCRIPT_MARKER, collapse_whitespace, normalize, reflow};
