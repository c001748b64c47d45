//! Progress persistence
//!
//! The engine only talks to the [`ProgressStore`] port. Two adapters ship
//! with the crate: SQLite (`~/.bizquest/progress.db`) and an in-memory map.

mod db;
mod memory;

pub use db::SqliteProgressStore;
pub use memory::MemoryProgressStore;

use serde::{Deserialize, Serialize};

/// Errors raised by storage adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to prepare store location: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// What the engine loads at construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProgress {
    pub points: u64,
    pub badges: Vec<String>,
}

/// What the engine writes back after mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub level: u32,
    pub points: u64,
    pub badges: Vec<String>,
}

/// Storage port for per-user progress
pub trait ProgressStore: Send + Sync {
    /// Load progress for a user. `Ok(None)` when nothing was stored yet.
    fn load(&self, user_id: &str) -> Result<Option<StoredProgress>, StoreError>;

    /// Replace the stored progress for a user
    fn save(&self, user_id: &str, record: &ProgressRecord) -> Result<(), StoreError>;

    /// Delete all progress for a user
    fn reset(&self, user_id: &str) -> Result<(), StoreError>;
}
