// src/storage/seen.rs

//! Content-addressed record of postings already delivered.

use chrono::{SecondsFormat, TimeDelta, Utc};
use rusqlite::params;

use crate::error::{AppError, Result};
use crate::models::{PostingRecord, SeenEntry};
use crate::storage::Database;
use crate::utils::text::{posting_id, truncate_graphemes};

/// Titles are kept only as an audit snippet.
const TITLE_SNIPPET_LEN: usize = 100;

/// Persistent set of posting identities.
#[derive(Clone)]
pub struct IdentityStore {
    db: Database,
}

impl IdentityStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// Has this posting been seen before? Marks it as seen when it has not.
    ///
    /// The check and the insert are one `INSERT OR IGNORE`, so two callers
    /// racing on the same identity get exactly one `false`.
    pub fn seen(&self, source: &str, description: &str, title: &str) -> Result<bool> {
        self.check_and_mark(source, description, title, "")
    }

    /// Same as [`seen`](Self::seen), also storing the posting link.
    pub fn seen_posting(&self, record: &PostingRecord) -> Result<bool> {
        self.check_and_mark(
            &record.source,
            &record.description,
            &record.title,
            &record.link,
        )
    }

    fn check_and_mark(&self, source: &str, description: &str, title: &str, link: &str) -> Result<bool> {
        let id = posting_id(source, description);
        let first_seen = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let inserted = self.db.lock().execute(
            "INSERT OR IGNORE INTO seen_jobs (id, source, link, title, first_seen)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                source,
                link,
                truncate_graphemes(title, TITLE_SNIPPET_LEN),
                first_seen
            ],
        )?;

        if inserted == 1 {
            log::info!("New posting: {}", truncate_graphemes(title, 50));
        }
        Ok(inserted == 0)
    }

    /// Number of seen postings.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .lock()
            .query_row("SELECT COUNT(*) FROM seen_jobs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Look up a seen entry by identity digest.
    pub fn get(&self, id: &str) -> Result<Option<SeenEntry>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, source, link, title, first_seen FROM seen_jobs WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok(SeenEntry {
                id: row.get(0)?,
                source: row.get(1)?,
                link: row.get(2)?,
                title: row.get(3)?,
                first_seen: row.get(4)?,
            })
        })?;

        Ok(rows.next().transpose()?)
    }

    /// Delete entries first seen more than `days` days ago.
    ///
    /// Never called by the ingestion loop; retention is an operator decision.
    pub fn prune_older_than(&self, days: u32) -> Result<usize> {
        let age = TimeDelta::try_days(i64::from(days))
            .ok_or_else(|| AppError::validation(format!("retention of {days} days is out of range")))?;
        let cutoff = (Utc::now() - age).to_rfc3339_opts(SecondsFormat::Secs, true);

        let deleted = self
            .db
            .lock()
            .execute("DELETE FROM seen_jobs WHERE first_seen < ?1", params![cutoff])?;
        Ok(deleted)
    }
}
