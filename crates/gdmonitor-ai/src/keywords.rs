//! Relevance taxonomy for municipal finance and debt-generating transactions.
//!
//! Each keyword is matched as a word-anchored stem: the keyword must start at
//! a word boundary, and any word characters may follow it before the closing
//! boundary, so `önkormányzat` also counts inside `önkormányzatok`.
//!
//! Keyword text is literal (`ix.` means the letters `i`, `x` and a dot) and
//! every internal space matches a run of one or more whitespace characters.
//! Word boundaries and `\w` follow Unicode semantics, so accented Hungarian
//! letters are word characters.

use std::collections::HashSet;

use regex::Regex;

use crate::AiError;

/// The fixed Hungarian keyword list, in scoring order.
pub const MUNICIPAL_FINANCE_TERMS: [&str; 9] = [
    "ix. helyi önkormányzatok",
    "települési önkormányzatok",
    "önkormányzatok adósságot keletkeztető",
    "gazdasági társaságok adósságot keletkeztető",
    "helyi önkormányzat",
    "önkormányzati adósság",
    "önkormányzati hitelfelvétel",
    "adósságot keletkeztető ügyletek",
    "iparűzési adó",
];

/// One compiled keyword.
#[derive(Debug, Clone)]
pub struct Keyword {
    term: String,
    pattern: Regex,
}

impl Keyword {
    pub fn new(term: &str) -> Result<Self, AiError> {
        let term = term.trim().to_lowercase();
        let body = term
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        let pattern =
            Regex::new(&format!(r"(?i)\b{body}\w*\b")).map_err(|source| AiError::Keyword {
                term: term.clone(),
                source,
            })?;
        Ok(Self { term, pattern })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Number of non-overlapping occurrences in `text`.
    pub fn count_in(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }
}

/// An ordered, duplicate-free list of keywords.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    /// The built-in municipal finance taxonomy.
    pub fn municipal_finance() -> Self {
        Self::from_terms(MUNICIPAL_FINANCE_TERMS).expect("built-in keywords compile")
    }

    /// Build a set from arbitrary terms. Blank terms and repeats (after
    /// lower-casing) are dropped; first occurrence wins the position.
    pub fn from_terms<I, S>(terms: I) -> Result<Self, AiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        for term in terms {
            let term = term.as_ref();
            if term.trim().is_empty() {
                continue;
            }
            let keyword = Keyword::new(term)?;
            if seen.insert(keyword.term.clone()) {
                keywords.push(keyword);
            }
        }
        Ok(Self { keywords })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.term())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::municipal_finance()
    }
}
