//! Terminal output: summary cards and run reports.

use std::path::Path;

use gdmonitor_core::{Gazette, SummaryEntry};
use gdmonitor_pipeline::BatchReport;
use gdmonitor_store::StoreCounts;

use crate::fetch::FetchStats;

const WRAP_WIDTH: usize = 76;

// ── Public API ──

/// Print one gazette header followed by a card per relevant resolution.
pub fn print_gazette_summaries(gazette: &Gazette, entries: &[SummaryEntry]) {
    println!("=== {} ===", gazette.title);
    println!("  {:<14} {}", "published", gazette.publication_date);
    println!("  {:<14} {}", "url", gazette.url);
    println!(
        "  {:<14} {}",
        "relevant",
        if gazette.relevant { "yes" } else { "no" }
    );
    println!();

    if entries.is_empty() {
        println!("  (no summaries)");
        println!();
        return;
    }
    for entry in entries {
        print_summary_card(entry);
    }
}

/// Consecutive entries of the same gazette, in input order.
pub fn group_by_gazette(entries: &[SummaryEntry]) -> Vec<(i64, &[SummaryEntry])> {
    entries
        .chunk_by(|a, b| a.gazette_id == b.gazette_id)
        .map(|group| (group[0].gazette_id, group))
        .collect()
}

pub fn print_fetch_stats(stats: &FetchStats) {
    if stats.downloaded.is_empty() {
        println!("No new gazette issues downloaded.");
    } else {
        println!("{} new gazette issue(s) downloaded:", stats.downloaded.len());
        for path in &stats.downloaded {
            println!("  - {}", path.display());
        }
    }
    if stats.failed > 0 {
        println!("{} download(s) failed; they will be retried next run.", stats.failed);
    }
}

pub fn print_batch_report(report: &BatchReport) {
    println!("Analysis");
    row("gazettes analyzed", report.documents_processed);
    row("without text", report.documents_without_text);
    row("failed", report.documents_failed);
    row("resolutions", report.resolutions_found);
    row("relevant", report.resolutions_relevant);
    row("relevant gazettes", report.gazettes_relevant);
}

pub fn print_status(db_file: &Path, counts: &StoreCounts) {
    println!("Database {}", db_file.display());
    row("gazettes", counts.gazettes);
    row("analyzed", counts.analyzed);
    row("pending", counts.gazettes.saturating_sub(counts.analyzed));
    row("relevant", counts.relevant);
    row("summaries", counts.summaries);
}

// ── Rendering ──

fn print_summary_card(entry: &SummaryEntry) {
    let title = if entry.resolution.is_empty() {
        "(unnamed resolution)"
    } else {
        entry.resolution.as_str()
    };
    println!("  {title}");
    if entry.score > 0 {
        println!("    {:<12} {}", "score", entry.score);
    }
    if !entry.keywords.is_empty() {
        println!("    {:<12} {}", "keywords", entry.keywords);
    }
    for line in wrap(&entry.summary, WRAP_WIDTH) {
        println!("    {line}");
    }
    println!();
}

fn row(label: &str, value: usize) {
    println!("  {label:<20} {value}");
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(gazette_id: i64, resolution: &str) -> SummaryEntry {
        SummaryEntry {
            gazette_id,
            resolution: resolution.into(),
            score: 1,
            keywords: "iparűzési adó".into(),
            summary: "x".into(),
        }
    }

    #[test]
    fn groups_consecutive_gazettes() {
        let entries = [entry(1, "a"), entry(1, "b"), entry(3, "c")];
        let groups = group_by_gazette(&entries);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, 1);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, 3);
    }

    #[test]
    fn wrap_respects_width_in_characters() {
        let lines = wrap("önkormányzati adósság és iparűzési adó", 22);
        assert_eq!(lines, vec!["önkormányzati adósság", "és iparűzési adó"]);
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap("a hosszúszóóóóóó b", 5), vec!["a", "hosszúszóóóóóó", "b"]);
    }

    #[test]
    fn wrap_empty() {
        assert!(wrap("   ", 10).is_empty());
    }
}
