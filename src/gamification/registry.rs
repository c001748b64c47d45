//! One engine per user for multi-user hosts
//!
//! Each user gets exactly one engine, so all of a user's mutations go
//! through the same state lock and never race on read-modify-write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::engine::{EngineSettings, GamificationEngine};
use super::sink::PresentationSink;
use crate::store::ProgressStore;

pub struct EngineRegistry {
    store: Arc<dyn ProgressStore>,
    sink: Arc<dyn PresentationSink>,
    settings: EngineSettings,
    engines: Mutex<HashMap<String, GamificationEngine>>,
}

impl EngineRegistry {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        sink: Arc<dyn PresentationSink>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            sink,
            settings,
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Engine for a user, loading it on first access.
    ///
    /// The store is read without holding the map lock. If two callers race
    /// on the first access, the engine inserted first wins and the other
    /// one is dropped before it is handed out.
    pub fn engine(&self, user_id: &str) -> GamificationEngine {
        if let Some(engine) = self.lock_engines().get(user_id) {
            return engine.clone();
        }

        let loaded = GamificationEngine::load(
            user_id,
            self.store.clone(),
            self.sink.clone(),
            self.settings.clone(),
        );

        self.lock_engines()
            .entry(user_id.to_string())
            .or_insert(loaded)
            .clone()
    }

    fn lock_engines(&self) -> MutexGuard<'_, HashMap<String, GamificationEngine>> {
        self.engines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn loaded_users(&self) -> Vec<String> {
        let engines = self.lock_engines();
        let mut users: Vec<String> = engines.keys().cloned().collect();
        users.sort();
        users
    }

    /// Shut down and forget a user's engine (e.g. on logout)
    pub async fn unload(&self, user_id: &str) {
        let engine = self.lock_engines().remove(user_id);
        if let Some(engine) = engine {
            engine.shutdown().await;
        }
    }

    /// Shut down every loaded engine
    pub async fn shutdown_all(&self) {
        let engines: Vec<GamificationEngine> = self
            .lock_engines()
            .drain()
            .map(|(_, engine)| engine)
            .collect();

        for engine in engines {
            engine.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::sink::NullSink;
    use crate::store::{MemoryProgressStore, ProgressRecord, StoreError, StoredProgress};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};

    /// Store that checks whether the registry map is free while loading
    #[derive(Default)]
    struct LockObservingStore {
        registry: OnceLock<Weak<EngineRegistry>>,
        loads: AtomicUsize,
        map_free_during_load: AtomicBool,
    }

    impl ProgressStore for LockObservingStore {
        fn load(&self, _user_id: &str) -> Result<Option<StoredProgress>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if let Some(registry) = self.registry.get().and_then(Weak::upgrade) {
                let free = registry.engines.try_lock().is_ok();
                self.map_free_during_load.store(free, Ordering::SeqCst);
            }
            Ok(Some(StoredProgress {
                points: 40,
                badges: Vec::new(),
            }))
        }

        fn save(&self, _user_id: &str, _record: &ProgressRecord) -> Result<(), StoreError> {
            Ok(())
        }

        fn reset(&self, _user_id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn registry(store: Arc<MemoryProgressStore>) -> EngineRegistry {
        EngineRegistry::new(store, Arc::new(NullSink), EngineSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_user_shares_engine() {
        let registry = registry(Arc::new(MemoryProgressStore::new()));

        registry.engine("alice").add_points(30);
        registry.engine("alice").add_points(30);
        registry.engine("bob").add_points(5);

        assert_eq!(registry.engine("alice").points(), 60);
        assert_eq!(registry.engine("bob").points(), 5);
        assert_eq!(registry.loaded_users(), vec!["alice", "bob"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_access_loads_outside_map_lock() {
        let store = Arc::new(LockObservingStore::default());
        let registry = Arc::new(EngineRegistry::new(
            store.clone(),
            Arc::new(NullSink),
            EngineSettings::default(),
        ));
        store.registry.set(Arc::downgrade(&registry)).unwrap();

        let engine = registry.engine("alice");
        assert!(store.map_free_during_load.load(Ordering::SeqCst));
        assert_eq!(engine.points(), 40);

        // Later accesses reuse the cached engine without touching the store
        registry.engine("alice").add_points(10);
        assert_eq!(engine.points(), 50);
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_all_persists_every_user() {
        let store = Arc::new(MemoryProgressStore::new());
        let registry = registry(store.clone());

        registry.engine("alice").add_points(70);
        registry.engine("bob").earn_badge("first-client");
        registry.shutdown_all().await;

        assert_eq!(store.record("alice").unwrap().points, 70);
        assert_eq!(store.record("bob").unwrap().points, 200);
        assert!(registry.loaded_users().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unload_then_reload_reads_store() {
        let store = Arc::new(MemoryProgressStore::new());
        let registry = registry(store);

        registry.engine("alice").add_points(120);
        registry.unload("alice").await;

        assert_eq!(registry.engine("alice").points(), 120);
    }
}
