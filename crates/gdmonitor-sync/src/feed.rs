//! RSS feed of the official gazette.
//!
//! The feed lists every publication of the gazette office. Only items whose
//! title names the gazette itself are kept. Item links point at a viewer
//! page; the PDF lives at the same path with `megtekintes` replaced by
//! `letoltes`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, info, warn};

use crate::SyncError;

/// Item titles must contain this to count as a gazette issue.
pub const GAZETTE_TITLE_MARKER: &str = "Magyar Közlöny";

/// One gazette issue announced in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    /// PDF download URL.
    pub url: String,
    /// Raw `pubDate` text.
    pub published: String,
    /// `pubDate` parsed as RFC 2822, if it parses.
    pub published_date: Option<DateTime<FixedOffset>>,
}

#[derive(Default)]
struct RawItem {
    title: String,
    link: String,
    pub_date: String,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    PubDate,
}

/// Parse RSS `xml` into gazette entries, in feed order.
///
/// With `since` set, entries published on or before that day are dropped.
/// Entries whose date does not parse are always kept.
pub fn parse_feed(xml: &str, since: Option<NaiveDate>) -> Result<Vec<FeedEntry>, SyncError> {
    let items = read_items(xml)?;
    info!(count = items.len(), "feed items");

    let mut entries = Vec::new();
    for item in items {
        if !item.title.contains(GAZETTE_TITLE_MARKER) {
            continue;
        }
        let published_date = parse_pub_date(&item.pub_date);
        if let (Some(since), Some(date)) = (since, published_date)
            && date.date_naive() <= since
        {
            debug!(title = %item.title, date = %date.date_naive(), "older than cutoff");
            continue;
        }

        let entry = FeedEntry {
            url: item.link.replace("megtekintes", "letoltes"),
            title: item.title,
            published: item.pub_date,
            published_date,
        };
        info!(
            title = %entry.title,
            date = ?entry.published_date.map(|d| d.date_naive()),
            "gazette in feed"
        );
        entries.push(entry);
    }

    info!(count = entries.len(), "gazette entries in feed");
    Ok(entries)
}

fn read_items(xml: &str) -> Result<Vec<RawItem>, SyncError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SyncError::Feed(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" => current = Some(RawItem::default()),
                b"title" => field = Some(Field::Title),
                b"link" => field = Some(Field::Link),
                b"pubDate" => field = Some(Field::PubDate),
                _ => field = None,
            },
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| SyncError::Feed(e.to_string()))?;
                push_field(current.as_mut(), field, &text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                push_field(current.as_mut(), field, &text);
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"item"
                    && let Some(item) = current.take()
                {
                    items.push(item);
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(items)
}

fn push_field(item: Option<&mut RawItem>, field: Option<Field>, text: &str) {
    let (Some(item), Some(field)) = (item, field) else {
        return;
    };
    let target = match field {
        Field::Title => &mut item.title,
        Field::Link => &mut item.link,
        Field::PubDate => &mut item.pub_date,
    };
    target.push_str(text.trim());
}

fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    if raw.trim().is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(pub_date = raw, error = %e, "unparseable pubDate");
            None
        }
    }
}

/// File name for a downloaded gazette.
///
/// Letters, digits, `.`, `_` and `-` are kept and everything else becomes
/// `_`. A `_YYYYmmddHHMMSS.pdf` suffix keeps repeated downloads of the same
/// title apart.
pub fn gazette_filename(title: &str, now: NaiveDateTime) -> String {
    let clean: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{clean}_{}.pdf", now.format("%Y%m%d%H%M%S"))
}
