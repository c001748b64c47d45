//! In-memory progress store

use std::collections::HashMap;
use std::sync::Mutex;

use super::{ProgressRecord, ProgressStore, StoreError, StoredProgress};

/// Keeps progress in a map and remembers every save.
///
/// Useful for embedding without a database and for observing how many
/// writes the debouncer actually issued.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Mutex<HashMap<String, ProgressRecord>>,
    saves: Mutex<Vec<(String, ProgressRecord)>>,
    fail_saves: bool,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every save (for exercising failure logging)
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Seed a user's progress
    pub fn with_progress(self, user_id: &str, points: u64, badges: &[&str]) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(
                user_id.to_string(),
                ProgressRecord {
                    level: crate::gamification::Level::for_points(points),
                    points,
                    badges: badges.iter().map(|b| b.to_string()).collect(),
                },
            );
        }
        self
    }

    /// Latest record for a user
    pub fn record(&self, user_id: &str) -> Option<ProgressRecord> {
        self.records.lock().ok()?.get(user_id).cloned()
    }

    /// Number of saves issued for a user
    pub fn save_count(&self, user_id: &str) -> usize {
        self.saves
            .lock()
            .map(|saves| saves.iter().filter(|(u, _)| u == user_id).count())
            .unwrap_or(0)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, user_id: &str) -> Result<Option<StoredProgress>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(user_id).map(|r| StoredProgress {
            points: r.points,
            badges: r.badges.clone(),
        }))
    }

    fn save(&self, user_id: &str, record: &ProgressRecord) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Io(std::io::Error::other("save rejected")));
        }
        self.records
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(user_id.to_string(), record.clone());
        self.saves
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .push((user_id.to_string(), record.clone()));
        Ok(())
    }

    fn reset(&self, user_id: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .remove(user_id);
        Ok(())
    }
}
