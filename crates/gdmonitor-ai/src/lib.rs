//! Text-mining layer: keyword relevance scoring and sentence segmentation.

mod error;
pub mod keywords;
pub mod scorer;
pub mod segmenter;

pub use error::AiError;
pub use keywords::{Keyword, KeywordSet, MUNICIPAL_FINANCE_TERMS};
pub use scorer::{KeywordHit, KeywordTally, Relevance, RelevanceResult, RelevanceScorer};
pub use segmenter::{HungarianSegmenter, SentenceSegmenter};
