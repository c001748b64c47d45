//! SQLite progress store with schema management
//!
//! Manages the `~/.bizquest/progress.db` database and its schema version.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use super::{ProgressRecord, ProgressStore, StoreError, StoredProgress};

/// SQLite-backed [`ProgressStore`]
#[derive(Clone)]
pub struct SqliteProgressStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProgressStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Self::from_connection(conn)
    }

    /// In-memory database (nothing survives the process)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        // Version 1 is the only schema so far; later changes bump schema_version
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Schema version currently applied
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let conn = self.conn()?;
        let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))?;
        Ok(version)
    }

    /// All user ids with stored progress
    pub fn users(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id FROM player_progress ORDER BY user_id")?;
        let users = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(users)
    }
}

impl ProgressStore for SqliteProgressStore {
    fn load(&self, user_id: &str) -> Result<Option<StoredProgress>, StoreError> {
        let conn = self.conn()?;

        let points: Option<i64> = conn
            .query_row(
                "SELECT points FROM player_progress WHERE user_id = ?1",
                [user_id],
                |r| r.get(0),
            )
            .optional()?;

        let Some(points) = points else {
            return Ok(None);
        };

        let mut stmt =
            conn.prepare("SELECT badge_id FROM badges WHERE user_id = ?1 ORDER BY badge_id")?;
        let badges: Vec<String> = stmt
            .query_map([user_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(Some(StoredProgress {
            points: points.max(0) as u64,
            badges,
        }))
    }

    fn save(&self, user_id: &str, record: &ProgressRecord) -> Result<(), StoreError> {
        let now = Utc::now().timestamp_millis();
        let points = i64::try_from(record.points).unwrap_or(i64::MAX);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO player_progress (user_id, points, level, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                points = ?2, level = ?3, updated_at = ?4
            "#,
            rusqlite::params![user_id, points, record.level, now],
        )?;

        // Badges are never removed; existing rows keep their original timestamp
        for badge_id in &record.badges {
            tx.execute(
                "INSERT OR IGNORE INTO badges (user_id, badge_id, earned_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![user_id, badge_id, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn reset(&self, user_id: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM badges WHERE user_id = ?1", [user_id])?;
        conn.execute("DELETE FROM player_progress WHERE user_id = ?1", [user_id])?;
        Ok(())
    }
}

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- Point balance per user (level is derived, stored for reporting only)
CREATE TABLE IF NOT EXISTS player_progress (
    user_id TEXT PRIMARY KEY,
    points INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER NOT NULL
);

-- Earned badges
CREATE TABLE IF NOT EXISTS badges (
    user_id TEXT NOT NULL,
    badge_id TEXT NOT NULL,
    earned_at INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, badge_id)
);
CREATE INDEX IF NOT EXISTS idx_badges_user ON badges(user_id);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
