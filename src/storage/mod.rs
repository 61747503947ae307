//! SQLite persistence for subscribers and seen postings.
//!
//! ## Schema
//!
//! ```text
//! subscribers(user_id INTEGER PRIMARY KEY)
//! seen_jobs(id TEXT PRIMARY KEY, source, link, title, first_seen)
//!   idx_seen_first_seen ON seen_jobs(first_seen)
//! ```
//!
//! One connection is shared behind a mutex by the ingestion loop and the
//! command poller. Check-and-set operations are single statements, so they
//! stay atomic across connections and processes as well.

mod seen;
mod subscribers;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;

pub use seen::IdentityStore;
pub use subscribers::SubscriberRegistry;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS subscribers (
        user_id INTEGER PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS seen_jobs (
        id TEXT PRIMARY KEY,
        source TEXT NOT NULL,
        link TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL DEFAULT '',
        first_seen TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_seen_first_seen ON seen_jobs(first_seen);
";

/// Shared SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn identity(&self) -> IdentityStore {
        IdentityStore::new(self.clone())
    }

    pub fn subscribers(&self) -> SubscriberRegistry {
        SubscriberRegistry::new(self.clone())
    }

    /// Lock the connection. A poisoned lock still guards a usable connection.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
