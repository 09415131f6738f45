//! Sync layer: gazette RSS feed and PDF downloads.

pub mod feed;
pub mod http;

pub use feed::{FeedEntry, gazette_filename, parse_feed};
pub use http::{GazetteClient, SyncError};
