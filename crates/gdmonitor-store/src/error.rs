use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("gazette not found: {0}")]
    NotFound(i64),

    #[error("gazette {0} is already analyzed")]
    AlreadyAnalyzed(i64),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed for {path}: {reason}")]
    Pdf {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("feature not enabled: rebuild with --features {0}")]
    FeatureDisabled(&'static str),
}
