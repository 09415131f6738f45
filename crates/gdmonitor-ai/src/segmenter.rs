//! Sentence segmentation for Hungarian legal text.
//!
//! Splits on Unicode sentence boundaries (UAX #29), then re-joins fragments
//! that were cut after something that only looks like a sentence end:
//!
//! - a known abbreviation (`Korm.`, `stb.`, `pl.`)
//! - a Roman numeral (`(V. 15.)`, `IX. fejezet`)
//! - a list marker (`1.` opening a numbered point)
//! - a number inside a bracketed date (`(V. 15.)`)
//! - a number the next fragment continues (`2024. június`, `1234/2024. (V.`)
//! - a fragment made only of punctuation
//!
//! The abbreviation list is the segmenter's model. It is loaded once at
//! startup and read-only afterwards.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

use crate::AiError;

/// Abbreviations that end in a period without ending the sentence.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "korm", "stb", "pl", "ill", "sz", "tv", "kb", "vö", "ún", "dr", "ifj", "id", "ld", "bek",
    "alp", "pont", "évf", "jan", "febr", "márc", "ápr", "máj", "jún", "júl", "aug", "szept",
    "okt", "nov", "dec", "hrsz", "kft", "zrt", "nyrt", "rt", "kht", "u", "krt", "mrd", "vm",
    "min", "nsz", "ptk", "btk", "áht", "mötv", "ötv", "gst",
];

const MONTHS: &[&str] = &[
    "január", "február", "március", "április", "május", "június", "július", "augusztus",
    "szeptember", "október", "november", "december",
];

/// Splits text into sentences.
///
/// Implementations must be deterministic and safe to share across threads.
pub trait SentenceSegmenter: Send + Sync {
    fn sentences(&self, text: &str) -> Result<Vec<String>, AiError>;
}

/// Rule-based segmenter tuned for Hungarian gazette prose.
#[derive(Debug, Clone)]
pub struct HungarianSegmenter {
    abbreviations: HashSet<String>,
}

impl Default for HungarianSegmenter {
    fn default() -> Self {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS.iter().copied())
    }
}

impl HungarianSegmenter {
    /// Load the segmenter model.
    ///
    /// `None` uses the built-in abbreviation list. `Some(path)` adds the
    /// abbreviations in that file (one per line, `#` starts a comment, a
    /// trailing period is optional). A missing, unreadable, or empty file is
    /// [`AiError::ModelUnavailable`].
    pub fn load(model: Option<&Path>) -> Result<Self, AiError> {
        let Some(path) = model else {
            let segmenter = Self::default();
            info!(
                abbreviations = segmenter.abbreviations.len(),
                "using built-in sentence model"
            );
            return Ok(segmenter);
        };

        let unavailable = |reason: String| AiError::ModelUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if !path.exists() {
            return Err(unavailable("file not found".into()));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;

        let extra: Vec<&str> = raw
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .collect();
        if extra.is_empty() {
            return Err(unavailable("no abbreviations in model file".into()));
        }

        let segmenter =
            Self::with_abbreviations(DEFAULT_ABBREVIATIONS.iter().copied().chain(extra));
        info!(
            abbreviations = segmenter.abbreviations.len(),
            model = %path.display(),
            "loaded sentence model"
        );
        Ok(segmenter)
    }

    pub fn with_abbreviations<'a>(abbreviations: impl IntoIterator<Item = &'a str>) -> Self {
        let abbreviations = abbreviations
            .into_iter()
            .map(|a| a.trim().trim_end_matches('.').to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        Self { abbreviations }
    }

    pub fn abbreviation_count(&self) -> usize {
        self.abbreviations.len()
    }

    /// Whether a fragment ends in a period that does not close a sentence.
    ///
    /// `next` is the fragment that follows, if any. A number followed by a
    /// capitalised word ends the sentence (`Határidő: 2024. június 30. A ...`)
    /// unless the word is a month name.
    fn is_false_stop(&self, fragment: &str, next: Option<&str>) -> bool {
        let untrimmed = fragment.trim_end();
        let trimmed = untrimmed.trim_end_matches([')', ']', '"', '\'', '”', '»']);
        let bracketed = trimmed.len() < untrimmed.len();
        let Some(before_dot) = trimmed.strip_suffix('.') else {
            return false;
        };
        let token = before_dot
            .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '[')
            .next()
            .unwrap_or("");
        if token.is_empty() {
            return false;
        }

        if self.abbreviations.contains(&token.to_lowercase()) || is_roman_numeral(token) {
            return true;
        }
        if !is_number(token) {
            return false;
        }
        if bracketed || before_dot.trim() == token {
            return true;
        }
        next.is_some_and(continues_number)
    }
}

impl SentenceSegmenter for HungarianSegmenter {
    fn sentences(&self, text: &str) -> Result<Vec<String>, AiError> {
        let mut sentences: Vec<String> = Vec::new();
        let mut pending = String::new();

        let mut fragments = text.split_sentence_bounds().peekable();
        while let Some(fragment) = fragments.next() {
            // Stray punctuation belongs to the sentence before it.
            if pending.is_empty()
                && !fragment.chars().any(char::is_alphanumeric)
                && let Some(last) = sentences.last_mut()
            {
                last.push_str(fragment.trim_end());
                continue;
            }

            pending.push_str(fragment);
            if self.is_false_stop(&pending, fragments.peek().copied()) {
                continue;
            }
            push_trimmed(&mut sentences, &pending);
            pending.clear();
        }
        push_trimmed(&mut sentences, &pending);

        Ok(sentences)
    }
}

fn push_trimmed(sentences: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Whether `next` reads as the rest of a phrase that a number started.
fn continues_number(next: &str) -> bool {
    let next = next.trim_start();
    let Some(first) = next.chars().next() else {
        return false;
    };
    if !first.is_uppercase() {
        return true;
    }
    let word: String = next
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    MONTHS.contains(&word.as_str())
}

fn is_roman_numeral(token: &str) -> bool {
    token.len() <= 4 && token.chars().all(|c| matches!(c, 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'))
}

fn is_number(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '/' || c == '-')
}
