//! Analysis pass over downloaded gazettes.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use gdmonitor_ai::{HungarianSegmenter, RelevanceScorer};
use gdmonitor_pipeline::{BatchReport, run_batch};
use gdmonitor_store::{PdfDocumentSource, SqliteStore};
use tracing::info;

/// Load the sentence model and build the municipal finance scorer.
///
/// Fails before any gazette is touched if the model cannot be loaded.
pub fn load_scorer(model: Option<&Path>) -> anyhow::Result<RelevanceScorer> {
    let segmenter = HungarianSegmenter::load(model).context("loading sentence model")?;
    Ok(RelevanceScorer::municipal_finance(Arc::new(segmenter)))
}

/// Run the batch pipeline over every unanalyzed gazette in `store`.
pub fn analyze_pending(
    store: &mut SqliteStore,
    download_dir: &Path,
    scorer: &RelevanceScorer,
) -> anyhow::Result<BatchReport> {
    let start = Instant::now();
    let source = PdfDocumentSource::new(download_dir);
    let report = run_batch(store, &source, scorer).context("analyzing gazettes")?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "analysis finished");
    Ok(report)
}
