//! Citation parser: recovers government resolutions from extracted gazette text.
//!
//! Every resolution in a gazette issue opens with a citation header:
//!
//! ```text
//! A Kormány 1234/2024. (V. 15.) Korm. határozata
//! ```
//!
//! PDF extraction wraps lines at arbitrary points and sometimes doubles or
//! drops punctuation, so the header grammar tolerates any mix of whitespace,
//! `.` and `|` between its parts. Matching is case-insensitive and unanchored.
//!
//! # Algorithm
//!
//! 1. Find every header span in document order.
//! 2. The body of header *k* runs from its end to the start of header *k+1*,
//!    or to the end of the text for the last header.
//! 3. Validate each candidate; a candidate that fails validation is skipped
//!    but still bounds the body of the record before it.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::resolution::ResolutionRecord;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)A\s+Kormány\s+([0-9]+)[/\s]+([0-9]{4})[.|\s]+\(+([IVXLCDM]+)[.|\s]+([0-9]+)[.|\s]+\)+\s+Korm[.|\s]+határozata",
    )
    .expect("citation header pattern compiles")
});

/// Why a header candidate was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CitationError {
    #[error("resolution number out of range: {0}")]
    Number(String),

    #[error("year out of range: {0}")]
    Year(String),

    #[error("day out of range: {0}")]
    Day(String),

    #[error("unknown Roman month: {0}")]
    UnknownMonth(String),

    #[error("invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

/// A header that matched the grammar but did not yield a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCitation {
    /// Byte offset of the header in the input text.
    pub offset: usize,
    /// Header text exactly as it appeared in the input.
    pub header: String,
    pub reason: CitationError,
}

/// Records and skipped candidates from one parse call.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<ResolutionRecord>,
    pub skipped: Vec<SkippedCitation>,
}

/// Parse all resolutions from `text`, in document order.
///
/// Skipped candidates are logged and dropped; use [`parse_with_skips`] to
/// inspect them.
pub fn parse(text: &str) -> Vec<ResolutionRecord> {
    parse_with_skips(text).records
}

/// Parse all resolutions from `text`, reporting skipped candidates.
pub fn parse_with_skips(text: &str) -> ParseOutcome {
    let headers: Vec<Captures<'_>> = HEADER.captures_iter(text).collect();
    let mut outcome = ParseOutcome::default();

    for (i, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let body = &text[whole.end()..body_end];

        match build_record(caps, body) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                warn!(offset = whole.start(), header = whole.as_str(), %reason, "skipping citation");
                outcome.skipped.push(SkippedCitation {
                    offset: whole.start(),
                    header: whole.as_str().to_string(),
                    reason,
                });
            }
        }
    }

    debug!(
        records = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "parsed citations"
    );
    outcome
}

fn build_record(caps: &Captures<'_>, body: &str) -> Result<ResolutionRecord, CitationError> {
    let number = &caps[1];
    number
        .parse::<u64>()
        .map_err(|_| CitationError::Number(number.to_string()))?;
    let year: i32 = caps[2]
        .parse()
        .map_err(|_| CitationError::Year(caps[2].to_string()))?;
    let day: u32 = caps[4]
        .parse()
        .map_err(|_| CitationError::Day(caps[4].to_string()))?;

    ResolutionRecord::new(number, year, &caps[3], day, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TWO_RESOLUTIONS: &str = "
    A Kormány 1234/2024. (V. 15.) Korm. határozata
    a teszt kormányhatározat tartalmáról

    1. A Kormány támogatja a tesztprojekt megvalósítását.
    2. A Kormány felhívja a pénzügyminisztert, hogy gondoskodjon a szükséges forrásokról.

    A Kormány 5678/2024. (VI. 20.) Korm. határozata
    egy másik teszt határozatról

    1. A Kormány további intézkedésekről dönt.
    ";

    #[test]
    fn extracts_two_resolutions_in_order() {
        let records = parse(TWO_RESOLUTIONS);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.number(), "1234");
        assert_eq!(first.year(), 2024);
        assert_eq!(first.month(), 5);
        assert_eq!(first.day(), 15);
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
        assert!(first.content().contains("teszt kormányhatározat"));
        assert!(first.content().ends_with("forrásokról."));

        let second = &records[1];
        assert_eq!(second.number(), "5678");
        assert_eq!(second.month(), 6);
        assert_eq!(second.day(), 20);
        assert_eq!(second.date(), NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        assert!(second.content().contains("másik teszt határozatról"));
    }

    #[test]
    fn content_excludes_neighbouring_headers() {
        let records = parse(TWO_RESOLUTIONS);
        assert!(!records[0].content().contains("5678/2024"));
        assert!(!records[1].content().contains("1234/2024"));
        assert!(!records[1].content().contains("Korm. határozata"));
    }

    #[test]
    fn whitespace_normalised_input() {
        let text = "A Kormány 1234/2024. (V. 15.) Korm. határozata első. \
                    A Kormány 5678/2024. (VI. 20.) Korm. határozata második.";
        let records = parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content(), "első.");
        assert_eq!(records[1].content(), "második.");
    }

    #[test]
    fn empty_text() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn text_without_resolutions() {
        assert!(parse("Ez a szöveg nem tartalmaz kormányhatározatot.").is_empty());
    }

    #[test]
    fn header_wrapped_across_lines() {
        let text = "A\nKormány\n1234\n/\n2024.\n(V.\n15.)\nKorm.\nhatározata\nszöveg";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].title(),
            "A Kormány 1234/2024. (V. 15.) Korm. határozata"
        );
        assert_eq!(records[0].content(), "szöveg");
    }

    #[test]
    fn case_insensitive_header() {
        let records = parse("a kormány 12/2023. (xii. 1.) korm. határozata törzs");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].month(), 12);
        assert_eq!(
            records[0].title(),
            "A Kormány 12/2023. (XII. 1.) Korm. határozata"
        );
    }

    #[test]
    fn tolerates_mixed_separators() {
        let records = parse("A Kormány 77 2022 | ((III . 3 .)) Korm határozata x");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number(), "77");
        assert_eq!(records[0].month(), 3);
        assert_eq!(records[0].day(), 3);
    }

    #[test]
    fn malformed_numerics_do_not_match() {
        let text = "A Kormány 12a4/2024. (V. 15.) Korm. határozata rossz. \
                    A Kormány 99/2024. (V. 16.) Korm. határozata jó.";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number(), "99");
    }

    #[test]
    fn unknown_month_is_skipped_and_parsing_continues() {
        let text = "A Kormány 1/2024. (XIII. 1.) Korm. határozata hibás. \
                    A Kormány 2/2024. (I. 2.) Korm. határozata helyes.";
        let outcome = parse_with_skips(text);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].number(), "2");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(
            outcome.skipped[0].reason,
            CitationError::UnknownMonth("XIII".into())
        );
        assert_eq!(outcome.skipped[0].offset, 0);
    }

    #[test]
    fn invalid_date_is_skipped_but_bounds_previous_body() {
        let text = "A Kormány 1/2023. (I. 5.) Korm. határozata első. \
                    A Kormány 2/2023. (II. 30.) Korm. határozata hibás. \
                    A Kormány 3/2023. (III. 1.) Korm. határozata harmadik.";
        let outcome = parse_with_skips(text);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].content(), "első.");
        assert_eq!(outcome.records[1].number(), "3");
        assert!(matches!(
            outcome.skipped[0].reason,
            CitationError::InvalidDate { month: 2, day: 30, .. }
        ));
    }

    #[test]
    fn oversized_number_is_skipped() {
        let text = "A Kormány 99999999999999999999999/2024. (V. 15.) Korm. határozata x";
        let outcome = parse_with_skips(text);
        assert!(outcome.records.is_empty());
        assert!(matches!(outcome.skipped[0].reason, CitationError::Number(_)));
    }

    #[test]
    fn title_reparses_to_equivalent_record() {
        let original = &parse(TWO_RESOLUTIONS)[1];
        let reparsed = parse(original.title());
        assert_eq!(reparsed.len(), 1);
        let again = &reparsed[0];
        assert_eq!(again.number(), original.number());
        assert_eq!(again.year(), original.year());
        assert_eq!(again.month(), original.month());
        assert_eq!(again.day(), original.day());
        assert_eq!(again.date(), original.date());
        assert_eq!(again.title(), original.title());
        assert_eq!(again.content(), "");
    }

    #[test]
    fn last_record_runs_to_end_of_text() {
        let records = parse("bevezető A Kormány 5/2021. (IV. 9.) Korm. határozata vége a szövegnek");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content(), "vége a szövegnek");
    }
}
