//! Interfaces the analysis pipeline needs from its collaborators.
//!
//! The pipeline never touches files, SQL, or HTTP directly. It reads gazette
//! text through [`DocumentSource`], learns which gazettes still need work
//! through [`GazetteSupply`], and records outcomes through [`GazetteSink`].

use crate::resolution::{Gazette, SummaryEntry};

/// Produces the plain text of a downloaded gazette.
///
/// An error and an empty string mean the same thing to the pipeline: there is
/// no parseable content.
pub trait DocumentSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn text(&self, gazette: &Gazette) -> Result<String, Self::Error>;
}

/// Lists gazettes that have not been analyzed yet.
pub trait GazetteSupply {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Unanalyzed gazettes, oldest first.
    fn list_unanalyzed(&self) -> Result<Vec<Gazette>, Self::Error>;
}

/// Persists per-gazette analysis results.
pub trait GazetteSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Move a gazette to its terminal analyzed state.
    fn mark_analyzed(&mut self, gazette_id: i64, relevant: bool) -> Result<(), Self::Error>;

    fn save_summary(&mut self, entry: &SummaryEntry) -> Result<(), Self::Error>;

    /// Persist every summary of a gazette and mark it analyzed.
    ///
    /// Implementations backed by a transactional store should override this
    /// so that a failure leaves the gazette untouched.
    fn record_outcome(
        &mut self,
        gazette_id: i64,
        relevant: bool,
        summaries: &[SummaryEntry],
    ) -> Result<(), Self::Error> {
        for entry in summaries {
            self.save_summary(entry)?;
        }
        self.mark_analyzed(gazette_id, relevant)
    }
}
