//! Shared record types passed between parser, scorer, store, and pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::citation::CitationError;
use crate::roman;

/// One government resolution recovered from a gazette's text.
///
/// Built only through [`ResolutionRecord::new`], which refuses dates that do
/// not exist on the calendar. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionRecord {
    number: String,
    year: i32,
    month: u32,
    day: u32,
    date: NaiveDate,
    title: String,
    content: String,
}

impl ResolutionRecord {
    /// Compose a record from the parts of a citation header and its body.
    ///
    /// `roman_month` is the citation's month token (`"V"`, `"xii"`). The
    /// title is rebuilt in canonical form, so line wrapping or letter case
    /// in the source text does not leak into it. `content` is trimmed.
    pub fn new(
        number: impl Into<String>,
        year: i32,
        roman_month: &str,
        day: u32,
        content: &str,
    ) -> Result<Self, CitationError> {
        let number = number.into();
        let month = roman::month_from_roman(roman_month);
        let canonical = roman::roman_month(month)
            .ok_or_else(|| CitationError::UnknownMonth(roman_month.to_string()))?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(CitationError::InvalidDate { year, month, day })?;
        let title = format!("A Kormány {number}/{year}. ({canonical}. {day}.) Korm. határozata");

        Ok(Self {
            number,
            year,
            month,
            day,
            date,
            title,
            content: content.trim().to_string(),
        })
    }

    /// Resolution number, unique only within one gazette issue.
    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Canonical citation, e.g. `A Kormány 1234/2024. (V. 15.) Korm. határozata`.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A downloaded gazette issue as registered in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gazette {
    pub id: i64,
    pub title: String,
    /// Raw `pubDate` string from the feed.
    pub publication_date: String,
    pub url: String,
    /// File name relative to the download directory.
    pub filename: String,
    /// ISO 8601 timestamp string.
    pub download_date: String,
    pub analyzed: bool,
    pub relevant: bool,
}

/// A gazette about to be registered after a successful download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGazette {
    pub title: String,
    pub publication_date: String,
    pub url: String,
    pub filename: String,
}

/// One persisted summary line for a relevant resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub gazette_id: i64,
    /// Canonical citation title of the resolution.
    pub resolution: String,
    pub score: u32,
    /// Matched keywords joined with `", "`.
    pub keywords: String,
    pub summary: String,
}
