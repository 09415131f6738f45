//! SQLite registry of downloaded gazettes and their resolution summaries.

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use gdmonitor_core::{Gazette, GazetteSink, GazetteSupply, NewGazette, SummaryEntry};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::StoreError;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS gazettes (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    publication_date TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    filename TEXT NOT NULL,
    download_date TEXT NOT NULL,
    analyzed INTEGER DEFAULT 0,
    relevant INTEGER DEFAULT 0,
    sent_email INTEGER DEFAULT 0
);
CREATE TABLE IF NOT EXISTS summary (
    id INTEGER PRIMARY KEY,
    gazette_id INTEGER NOT NULL,
    summary TEXT NOT NULL,
    resolution TEXT,
    score INTEGER,
    keywords TEXT,
    FOREIGN KEY (gazette_id) REFERENCES gazettes(id)
);
"#;

/// Columns added to `summary` after the first schema version. Databases
/// created before them are migrated in place on open.
const SUMMARY_EXTRA_COLUMNS: [(&str, &str); 3] = [
    ("resolution", "TEXT"),
    ("score", "INTEGER"),
    ("keywords", "TEXT"),
];

const GAZETTE_COLUMNS: &str =
    "id, title, publication_date, url, filename, download_date, analyzed, relevant";

/// Row counts for the status report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub gazettes: usize,
    pub analyzed: usize,
    pub relevant: usize,
    pub summaries: usize,
}

/// SQLite store for gazettes and summaries.
///
/// A gazette moves from unanalyzed to analyzed exactly once. The move and
/// the summaries that justify it are written in one transaction by
/// [`GazetteSink::record_outcome`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        debug!(path = %path.display(), "opened gazette store");
        Ok(Self { conn })
    }

    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        let existing: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('summary')")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        for (column, ty) in SUMMARY_EXTRA_COLUMNS {
            if !existing.iter().any(|c| c == column) {
                conn.execute_batch(&format!("ALTER TABLE summary ADD COLUMN {column} {ty}"))?;
                info!(column, "migrated summary table");
            }
        }
        Ok(())
    }

    // ── Gazettes ──

    /// Whether a gazette with this download URL is already registered.
    pub fn is_already_downloaded(&self, url: &str) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM gazettes WHERE url = ?1", [url], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Register a downloaded gazette, stamped with the current local time.
    pub fn save_gazette(&self, gazette: &NewGazette) -> Result<i64, StoreError> {
        self.save_gazette_at(gazette, Local::now().naive_local())
    }

    /// Register a downloaded gazette with an explicit download time.
    pub fn save_gazette_at(
        &self,
        gazette: &NewGazette,
        downloaded_at: NaiveDateTime,
    ) -> Result<i64, StoreError> {
        let download_date = downloaded_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        self.conn.execute(
            "INSERT INTO gazettes (title, publication_date, url, filename, download_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                gazette.title,
                gazette.publication_date,
                gazette.url,
                gazette.filename,
                download_date
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(gazette_id = id, title = %gazette.title, "registered gazette");
        Ok(id)
    }

    pub fn get_gazette(&self, id: i64) -> Result<Gazette, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {GAZETTE_COLUMNS} FROM gazettes WHERE id = ?1"),
                [id],
                gazette_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    // ── Summaries ──

    /// Summaries of one gazette, in insertion order.
    pub fn summaries_for(&self, gazette_id: i64) -> Result<Vec<SummaryEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT gazette_id, resolution, score, keywords, summary
             FROM summary WHERE gazette_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([gazette_id], summary_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Summaries of every relevant gazette, oldest gazette first.
    pub fn relevant_summaries(&self) -> Result<Vec<SummaryEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT s.gazette_id, s.resolution, s.score, s.keywords, s.summary
             FROM summary s JOIN gazettes g ON g.id = s.gazette_id
             WHERE g.relevant = 1
             ORDER BY s.gazette_id, s.id",
        )?;
        let rows = stmt.query_map([], summary_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    // ── Counts ──

    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let (gazettes, analyzed, relevant): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(analyzed), 0), COALESCE(SUM(relevant), 0)
             FROM gazettes",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let summaries: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM summary", [], |row| row.get(0))?;
        Ok(StoreCounts {
            gazettes: gazettes as usize,
            analyzed: analyzed as usize,
            relevant: relevant as usize,
            summaries: summaries as usize,
        })
    }
}

impl GazetteSupply for SqliteStore {
    type Error = StoreError;

    fn list_unanalyzed(&self) -> Result<Vec<Gazette>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GAZETTE_COLUMNS} FROM gazettes WHERE analyzed = 0 ORDER BY id"
        ))?;
        let rows = stmt.query_map([], gazette_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

impl GazetteSink for SqliteStore {
    type Error = StoreError;

    fn mark_analyzed(&mut self, gazette_id: i64, relevant: bool) -> Result<(), StoreError> {
        mark_analyzed_on(&self.conn, gazette_id, relevant)
    }

    fn save_summary(&mut self, entry: &SummaryEntry) -> Result<(), StoreError> {
        insert_summary(&self.conn, entry)
    }

    fn record_outcome(
        &mut self,
        gazette_id: i64,
        relevant: bool,
        summaries: &[SummaryEntry],
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        for entry in summaries {
            insert_summary(&tx, entry)?;
        }
        mark_analyzed_on(&tx, gazette_id, relevant)?;
        tx.commit()?;
        debug!(gazette_id, relevant, summaries = summaries.len(), "recorded outcome");
        Ok(())
    }
}

fn mark_analyzed_on(conn: &Connection, gazette_id: i64, relevant: bool) -> Result<(), StoreError> {
    let updated = conn.execute(
        "UPDATE gazettes SET analyzed = 1, relevant = ?1 WHERE id = ?2 AND analyzed = 0",
        params![relevant, gazette_id],
    )?;
    if updated == 1 {
        return Ok(());
    }
    let exists = conn
        .query_row("SELECT 1 FROM gazettes WHERE id = ?1", [gazette_id], |_| Ok(()))
        .optional()?
        .is_some();
    if exists {
        Err(StoreError::AlreadyAnalyzed(gazette_id))
    } else {
        Err(StoreError::NotFound(gazette_id))
    }
}

fn insert_summary(conn: &Connection, entry: &SummaryEntry) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO summary (gazette_id, resolution, score, keywords, summary)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.gazette_id,
            entry.resolution,
            entry.score,
            entry.keywords,
            entry.summary
        ],
    )?;
    Ok(())
}

fn gazette_from_row(row: &Row<'_>) -> rusqlite::Result<Gazette> {
    Ok(Gazette {
        id: row.get(0)?,
        title: row.get(1)?,
        publication_date: row.get(2)?,
        url: row.get(3)?,
        filename: row.get(4)?,
        download_date: row.get(5)?,
        analyzed: row.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
        relevant: row.get::<_, Option<i64>>(7)?.unwrap_or(0) != 0,
    })
}

/// Rows written before the extra summary columns existed read as empty.
fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<SummaryEntry> {
    Ok(SummaryEntry {
        gazette_id: row.get(0)?,
        resolution: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        score: row.get::<_, Option<u32>>(2)?.unwrap_or(0),
        keywords: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        summary: row.get(4)?,
    })
}
