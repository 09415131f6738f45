//! Batch analysis: gazette text → resolutions → relevance → stored outcome.
//!
//! Gazettes are processed one at a time, oldest first. Each gazette ends in
//! exactly one of two ways: its outcome is recorded and it becomes analyzed,
//! or a per-document error is logged and it stays unanalyzed for the next run.

mod error;
pub use error::PipelineError;

use gdmonitor_ai::{AiError, Relevance, RelevanceScorer};
use gdmonitor_core::{
    DocumentSource, Gazette, GazetteSink, GazetteSupply, ResolutionRecord, SummaryEntry,
    citation,
};
use serde::Serialize;
use tracing::{info, warn};

/// Scores one resolution. [`RelevanceScorer`] is the production scorer.
pub trait ResolutionScorer {
    fn score<'a>(&self, record: &'a ResolutionRecord) -> Result<Relevance<'a>, AiError>;
}

impl ResolutionScorer for RelevanceScorer {
    fn score<'a>(&self, record: &'a ResolutionRecord) -> Result<Relevance<'a>, AiError> {
        RelevanceScorer::score(self, record)
    }
}

/// What happened to one gazette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GazetteOutcome {
    pub gazette_id: i64,
    /// False when the text could not be extracted or was blank.
    pub text_available: bool,
    pub resolutions_found: usize,
    pub citations_skipped: usize,
    /// One entry per relevant resolution, in document order.
    pub summaries: Vec<SummaryEntry>,
    pub relevant: bool,
}

impl GazetteOutcome {
    fn without_text(gazette_id: i64) -> Self {
        Self {
            gazette_id,
            text_available: false,
            resolutions_found: 0,
            citations_skipped: 0,
            summaries: Vec::new(),
            relevant: false,
        }
    }
}

/// Totals for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Gazettes whose outcome was recorded.
    pub documents_processed: usize,
    /// Gazettes left unanalyzed after an error.
    pub documents_failed: usize,
    /// Recorded gazettes that had no usable text.
    pub documents_without_text: usize,
    pub resolutions_found: usize,
    pub resolutions_relevant: usize,
    pub gazettes_relevant: usize,
}

impl BatchReport {
    fn add(&mut self, outcome: &GazetteOutcome) {
        self.documents_processed += 1;
        if !outcome.text_available {
            self.documents_without_text += 1;
        }
        self.resolutions_found += outcome.resolutions_found;
        self.resolutions_relevant += outcome.summaries.len();
        if outcome.relevant {
            self.gazettes_relevant += 1;
        }
    }
}

/// Analyze one gazette and record its outcome.
///
/// Missing or blank text is not an error: the gazette is recorded as
/// analyzed and not relevant without running the parser. All summaries and
/// the analyzed flag go to the sink in a single [`GazetteSink::record_outcome`]
/// call, after every resolution has been scored.
pub fn analyze_gazette<S, K, R>(
    gazette: &Gazette,
    source: &S,
    sink: &mut K,
    scorer: &R,
) -> Result<GazetteOutcome, PipelineError>
where
    S: DocumentSource,
    K: GazetteSink,
    R: ResolutionScorer,
{
    let text = match source.text(gazette) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!(gazette_id = gazette.id, "gazette text is blank");
            None
        }
        Err(e) => {
            warn!(gazette_id = gazette.id, error = %e, "cannot extract gazette text");
            None
        }
    };

    let outcome = match text {
        Some(text) => evaluate(gazette.id, &text, scorer)?,
        None => GazetteOutcome::without_text(gazette.id),
    };

    sink.record_outcome(gazette.id, outcome.relevant, &outcome.summaries)
        .map_err(|e| PipelineError::Persistence {
            gazette_id: gazette.id,
            source: Box::new(e),
        })?;

    info!(
        gazette_id = gazette.id,
        resolutions = outcome.resolutions_found,
        relevant_resolutions = outcome.summaries.len(),
        relevant = outcome.relevant,
        "analyzed gazette"
    );
    Ok(outcome)
}

fn evaluate<R: ResolutionScorer>(
    gazette_id: i64,
    text: &str,
    scorer: &R,
) -> Result<GazetteOutcome, PipelineError> {
    let parsed = citation::parse_with_skips(text);
    let mut outcome = GazetteOutcome {
        gazette_id,
        text_available: true,
        resolutions_found: parsed.records.len(),
        citations_skipped: parsed.skipped.len(),
        summaries: Vec::new(),
        relevant: false,
    };

    for record in &parsed.records {
        let verdict = scorer
            .score(record)
            .map_err(|source| PipelineError::Scoring { gazette_id, source })?;
        if let Relevance::Relevant(result) = verdict {
            outcome.relevant = true;
            outcome.summaries.push(SummaryEntry {
                gazette_id,
                resolution: result.record.title().to_string(),
                score: result.score,
                keywords: result.keywords_joined(),
                summary: result.summary,
            });
        }
    }
    Ok(outcome)
}

/// Analyze every unanalyzed gazette in `store`, oldest first.
///
/// Per-document errors are logged and counted; they never stop the batch.
/// Only failing to list the pending gazettes is fatal.
pub fn run_batch<K, S, R>(store: &mut K, source: &S, scorer: &R) -> Result<BatchReport, PipelineError>
where
    K: GazetteSupply + GazetteSink,
    S: DocumentSource,
    R: ResolutionScorer,
{
    let mut pending = store
        .list_unanalyzed()
        .map_err(|e| PipelineError::Supply(Box::new(e)))?;
    pending.sort_by_key(|g| g.id);
    info!(count = pending.len(), "gazettes to analyze");

    let mut report = BatchReport::default();
    for gazette in &pending {
        match analyze_gazette(gazette, source, store, scorer) {
            Ok(outcome) => report.add(&outcome),
            Err(e) => {
                warn!(gazette_id = gazette.id, error = %e, "gazette left unanalyzed");
                report.documents_failed += 1;
            }
        }
    }

    info!(
        processed = report.documents_processed,
        failed = report.documents_failed,
        resolutions = report.resolutions_found,
        relevant_resolutions = report.resolutions_relevant,
        relevant_gazettes = report.gazettes_relevant,
        "batch complete"
    );
    Ok(report)
}
