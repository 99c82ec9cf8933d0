use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexError {
    #[error("invalid legal reference: {0:?}")]
    InvalidReference(String),

    #[error("article {article} not found")]
    ArticleNotFound { article: String },

    #[error("paragraph {paragraph} not found in the article")]
    ParagraphNotFound { paragraph: String },

    #[error("point {point} not found")]
    PointNotFound { point: String },

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
