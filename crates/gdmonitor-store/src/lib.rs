//! Storage layer: SQLite gazette registry and PDF document text.

mod error;
pub use error::StoreError;

mod documents;
pub use documents::{PdfDocumentSource, normalize_whitespace};

mod sqlite;
pub use sqlite::{SqliteStore, StoreCounts};
