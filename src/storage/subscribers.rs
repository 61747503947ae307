//! Subscriber registry.

use rusqlite::params;

use crate::error::Result;
use crate::storage::Database;

/// Persistent set of recipient ids.
#[derive(Clone)]
pub struct SubscriberRegistry {
    db: Database,
}

impl SubscriberRegistry {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add a recipient. Returns `false` if it was already subscribed.
    pub fn add(&self, recipient: i64) -> Result<bool> {
        let inserted = self.db.lock().execute(
            "INSERT OR IGNORE INTO subscribers (user_id) VALUES (?1)",
            params![recipient],
        )?;
        Ok(inserted == 1)
    }

    /// Remove a recipient. Returns `false` if it was not subscribed.
    pub fn remove(&self, recipient: i64) -> Result<bool> {
        let deleted = self
            .db
            .lock()
            .execute("DELETE FROM subscribers WHERE user_id = ?1", params![recipient])?;
        Ok(deleted == 1)
    }

    /// Current recipients in ascending id order.
    pub fn list(&self) -> Result<Vec<i64>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare("SELECT user_id FROM subscribers ORDER BY user_id")?;
        let recipients = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(recipients)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .lock()
            .query_row("SELECT COUNT(*) FROM subscribers", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
