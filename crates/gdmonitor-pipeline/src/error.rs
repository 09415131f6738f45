use gdmonitor_ai::AiError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot list unanalyzed gazettes: {0}")]
    Supply(#[source] BoxError),

    #[error("scoring failed for gazette {gazette_id}: {source}")]
    Scoring {
        gazette_id: i64,
        #[source]
        source: AiError,
    },

    #[error("cannot record outcome of gazette {gazette_id}: {source}")]
    Persistence {
        gazette_id: i64,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    /// The gazette a per-document failure belongs to.
    pub fn gazette_id(&self) -> Option<i64> {
        match self {
            Self::Supply(_) => None,
            Self::Scoring { gazette_id, .. } | Self::Persistence { gazette_id, .. } => {
                Some(*gazette_id)
            }
        }
    }
}
