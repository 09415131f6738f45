use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("sentence model unavailable at {}: {reason}", path.display())]
    ModelUnavailable { path: PathBuf, reason: String },

    #[error("sentence segmentation failed: {0}")]
    Segmentation(String),

    #[error("invalid keyword {term:?}: {source}")]
    Keyword {
        term: String,
        #[source]
        source: regex::Error,
    },
}
