pub mod citation;
pub mod ports;
pub mod resolution;
pub mod roman;

pub use citation::{CitationError, ParseOutcome, SkippedCitation, parse, parse_with_skips};
pub use ports::{DocumentSource, GazetteSink, GazetteSupply};
pub use resolution::{Gazette, NewGazette, ResolutionRecord, SummaryEntry};
pub use roman::{month_from_roman, roman_month};
