//! Keyword relevance scoring for government resolutions.
//!
//! Counts every keyword separately in a resolution's title and body. Title
//! hits weigh twice as much as body hits. A resolution with a positive score
//! is relevant and gets an extractive summary: its first sentences.

use std::fmt;
use std::sync::Arc;

use gdmonitor_core::ResolutionRecord;
use tracing::debug;

use crate::AiError;
use crate::keywords::KeywordSet;
use crate::segmenter::SentenceSegmenter;

/// Weight of one keyword occurrence in the title.
pub const TITLE_WEIGHT: u32 = 2;
/// Weight of one keyword occurrence in the body.
pub const CONTENT_WEIGHT: u32 = 1;
/// Number of leading sentences kept in a summary.
pub const SUMMARY_SENTENCES: usize = 3;

/// Occurrences of one keyword in one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    pub term: String,
    pub title_count: usize,
    pub content_count: usize,
}

impl KeywordHit {
    pub fn weight(&self) -> u32 {
        self.title_count as u32 * TITLE_WEIGHT + self.content_count as u32 * CONTENT_WEIGHT
    }
}

/// Keyword occurrences of one resolution, before any summarization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTally {
    pub score: u32,
    /// Keywords with at least one occurrence, in keyword-list order.
    pub hits: Vec<KeywordHit>,
}

impl KeywordTally {
    pub fn matched_keywords(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.term.clone()).collect()
    }
}

/// A relevant resolution with its score and summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceResult<'a> {
    pub record: &'a ResolutionRecord,
    pub score: u32,
    /// Distinct matched keywords, in keyword-list order.
    pub matched_keywords: Vec<String>,
    pub summary: String,
}

impl RelevanceResult<'_> {
    /// Matched keywords in their storage form.
    pub fn keywords_joined(&self) -> String {
        self.matched_keywords.join(", ")
    }
}

/// Scoring verdict for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance<'a> {
    Relevant(RelevanceResult<'a>),
    NotRelevant,
}

impl<'a> Relevance<'a> {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Relevant(_))
    }

    pub fn score(&self) -> u32 {
        match self {
            Self::Relevant(r) => r.score,
            Self::NotRelevant => 0,
        }
    }

    pub fn into_result(self) -> Option<RelevanceResult<'a>> {
        match self {
            Self::Relevant(r) => Some(r),
            Self::NotRelevant => None,
        }
    }
}

/// Scores resolutions against a keyword taxonomy.
///
/// Holds an explicit handle to the sentence segmenter, loaded once by the
/// caller. Scoring is read-only and repeatable.
pub struct RelevanceScorer {
    keywords: KeywordSet,
    segmenter: Arc<dyn SentenceSegmenter>,
}

impl RelevanceScorer {
    pub fn new(keywords: KeywordSet, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        Self {
            keywords,
            segmenter,
        }
    }

    /// Scorer over the built-in municipal finance keywords.
    pub fn municipal_finance(segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        Self::new(KeywordSet::municipal_finance(), segmenter)
    }

    /// Count keyword occurrences without summarizing.
    pub fn tally(&self, record: &ResolutionRecord) -> KeywordTally {
        self.tally_parts(record.title(), record.content())
    }

    /// Count keyword occurrences in a free-standing title and body.
    pub fn tally_parts(&self, title: &str, content: &str) -> KeywordTally {
        let mut tally = KeywordTally::default();
        for keyword in self.keywords.iter() {
            let hit = KeywordHit {
                term: keyword.term().to_string(),
                title_count: keyword.count_in(title),
                content_count: keyword.count_in(content),
            };
            if hit.title_count + hit.content_count > 0 {
                tally.score += hit.weight();
                tally.hits.push(hit);
            }
        }
        tally
    }

    /// Score one resolution.
    ///
    /// Irrelevant records return [`Relevance::NotRelevant`] without touching
    /// the segmenter. A segmenter failure is an error, never a verdict.
    pub fn score<'a>(&self, record: &'a ResolutionRecord) -> Result<Relevance<'a>, AiError> {
        let tally = self.tally(record);
        if tally.score == 0 {
            debug!(resolution = record.title(), "not relevant");
            return Ok(Relevance::NotRelevant);
        }

        let summary = self.summarize(record.content())?;
        debug!(
            resolution = record.title(),
            score = tally.score,
            keywords = tally.hits.len(),
            "relevant"
        );
        Ok(Relevance::Relevant(RelevanceResult {
            record,
            score: tally.score,
            matched_keywords: tally.matched_keywords(),
            summary,
        }))
    }

    /// The first [`SUMMARY_SENTENCES`] sentences of `content`, joined with
    /// `". "`. Sentences keep their own punctuation, so a sentence ending in
    /// a period is followed by `.. ` in the summary.
    pub fn summarize(&self, content: &str) -> Result<String, AiError> {
        let sentences = self.segmenter.sentences(content)?;
        Ok(sentences[..sentences.len().min(SUMMARY_SENTENCES)].join(". "))
    }
}

impl fmt::Debug for RelevanceScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelevanceScorer")
            .field("keywords", &self.keywords.terms().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
