//! Gamification engine - points, levels and badges for one user
//!
//! Owns the point balance and badge set, derives the level, notifies the
//! presentation sink and hands snapshots to the debounced persister.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use super::badges::BadgeSet;
use super::events::{AchievementEvent, ConfettiTrigger, LevelUp};
use super::levels::{Level, LevelProgress};
use super::persist::Persister;
use super::rewards::{BusinessAction, PointRewards};
use super::sink::PresentationSink;
use crate::config::Settings;
use crate::store::{ProgressRecord, ProgressStore};

/// Errors from checked engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GamificationError {
    #[error("Insufficient points: {available} available, {requested} requested")]
    InsufficientPoints { available: u64, requested: u64 },
}

/// Timing and reward knobs of an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Quiet period before a burst of mutations is written
    pub persist_debounce: Duration,
    /// Delay between a badge grant and its point bonus (zero = immediate)
    pub badge_bonus_delay: Duration,
    pub badge_bonus_points: u64,
    /// Apply still-pending badge bonuses on shutdown instead of dropping them
    pub flush_pending_bonuses: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            persist_debounce: Duration::from_millis(500),
            badge_bonus_delay: Duration::from_millis(500),
            badge_bonus_points: PointRewards::BADGE_BONUS,
            flush_pending_bonuses: true,
        }
    }
}

impl EngineSettings {
    pub fn with_persist_debounce(mut self, debounce: Duration) -> Self {
        self.persist_debounce = debounce;
        self
    }

    pub fn with_badge_bonus_delay(mut self, delay: Duration) -> Self {
        self.badge_bonus_delay = delay;
        self
    }

    pub fn with_badge_bonus_points(mut self, points: u64) -> Self {
        self.badge_bonus_points = points;
        self
    }

    pub fn with_flush_pending_bonuses(mut self, flush: bool) -> Self {
        self.flush_pending_bonuses = flush;
        self
    }
}

impl From<&Settings> for EngineSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            persist_debounce: Duration::from_millis(settings.persist_debounce_ms),
            badge_bonus_delay: Duration::from_millis(settings.badge_bonus_delay_ms),
            badge_bonus_points: settings.badge_bonus_points,
            flush_pending_bonuses: settings.flush_on_shutdown,
        }
    }
}

/// Read-only view of a user's progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub points: u64,
    pub level: u32,
    pub badges: Vec<String>,
    pub next_level_points: u64,
    pub progress_to_next: f32,
}

impl ProgressSnapshot {
    fn new(points: u64, badges: &BadgeSet) -> Self {
        let progress = LevelProgress::new(points);
        Self {
            points,
            level: progress.level,
            badges: badges.to_vec(),
            next_level_points: progress.next_level_points,
            progress_to_next: progress.progress_to_next(),
        }
    }
}

/// Result of [`GamificationEngine::record_action`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub points_awarded: u64,
    pub level_up: Option<LevelUp>,
    pub badge_earned: Option<String>,
}

struct EngineState {
    points: u64,
    badges: BadgeSet,
    /// Badges whose bonus has not been applied yet
    pending_bonuses: Vec<String>,
}

struct Inner {
    user_id: String,
    settings: EngineSettings,
    state: Mutex<EngineState>,
    sink: Arc<dyn PresentationSink>,
    persister: Persister,
    snapshots: watch::Sender<ProgressSnapshot>,
}

/// Point, level and badge engine for a single user.
///
/// Cheap to clone; clones share state. Dropping the last clone without
/// calling [`shutdown`](Self::shutdown) loses writes still inside the
/// debounce window and badge bonuses that have not fired yet.
#[derive(Clone)]
pub struct GamificationEngine {
    inner: Arc<Inner>,
}

impl GamificationEngine {
    /// Load a user's progress from `store` and start the engine.
    ///
    /// A failed load is logged and the engine starts from zero. Must be
    /// called inside a tokio runtime.
    pub fn load(
        user_id: impl Into<String>,
        store: Arc<dyn ProgressStore>,
        sink: Arc<dyn PresentationSink>,
        settings: EngineSettings,
    ) -> Self {
        let user_id = user_id.into();

        let stored = match store.load(&user_id) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(user = %user_id, "Failed to load progress, starting fresh: {}", e);
                Default::default()
            }
        };

        let badges: BadgeSet = stored.badges.into_iter().collect();
        let snapshot = ProgressSnapshot::new(stored.points, &badges);
        let (snapshots, _) = watch::channel(snapshot);
        let persister = Persister::spawn(user_id.clone(), store, settings.persist_debounce);

        tracing::debug!(
            user = %user_id,
            points = stored.points,
            badges = badges.len(),
            "Gamification engine loaded"
        );

        Self {
            inner: Arc::new(Inner {
                user_id,
                settings,
                state: Mutex::new(EngineState {
                    points: stored.points,
                    badges,
                    pending_bonuses: Vec::new(),
                }),
                sink,
                persister,
                snapshots,
            }),
        }
    }

    /// Level for a point total
    pub fn level_for(points: u64) -> u32 {
        Level::for_points(points)
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    pub fn points(&self) -> u64 {
        self.state().points
    }

    pub fn level(&self) -> u32 {
        Level::for_points(self.points())
    }

    pub fn badges(&self) -> Vec<String> {
        self.state().badges.to_vec()
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.state().badges.contains(badge_id)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state();
        ProgressSnapshot::new(state.points, &state.badges)
    }

    /// Receiver updated after every mutation
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Add (or, for redemption, subtract) points.
    ///
    /// The balance never drops below zero. Returns the level transition if
    /// the change crossed at least one threshold.
    pub fn add_points(&self, delta: i64) -> Option<LevelUp> {
        let level_up = {
            let mut state = self.state();
            self.apply_points(&mut state, delta)
        };
        if let Some(level_up) = level_up {
            self.announce_level_up(level_up);
        }
        level_up
    }

    /// Spend points on a reward.
    ///
    /// Unlike a negative [`add_points`](Self::add_points), this refuses to
    /// spend more than the current balance. Returns the remaining balance.
    pub fn redeem(&self, cost: u64) -> Result<u64, GamificationError> {
        let mut state = self.state();
        if state.points < cost {
            return Err(GamificationError::InsufficientPoints {
                available: state.points,
                requested: cost,
            });
        }
        let remaining = state.points - cost;
        self.set_points(&mut state, remaining);
        tracing::info!(user = %self.inner.user_id, cost, remaining = state.points, "Reward redeemed");
        Ok(state.points)
    }

    /// Grant a badge. Returns `false` if it was already earned.
    ///
    /// The point bonus follows after the configured delay as a separate
    /// mutation, so observers may see the badge before the points.
    pub fn earn_badge(&self, badge_id: &str) -> bool {
        {
            let mut state = self.state();
            if !state.badges.insert(badge_id) {
                return false;
            }
            state.pending_bonuses.push(badge_id.to_string());
            self.publish(&state);
        }

        tracing::info!(user = %self.inner.user_id, badge = badge_id, "Badge earned");
        self.announce(AchievementEvent::badge_earned(badge_id), false);

        let delay = self.inner.settings.badge_bonus_delay;
        if delay.is_zero() {
            self.apply_badge_bonus(badge_id);
        } else {
            let engine = Arc::downgrade(&self.inner);
            let badge_id = badge_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                apply_deferred_bonus(engine, &badge_id);
            });
        }

        true
    }

    /// Award the points for a business action and its first-time badge
    pub fn record_action(&self, action: BusinessAction) -> ActionOutcome {
        let points_awarded = action.points();
        let level_up = self.add_points(i64::try_from(points_awarded).unwrap_or(i64::MAX));
        let badge_earned = action
            .badge()
            .filter(|badge| self.earn_badge(badge.as_str()))
            .map(|badge| badge.as_str().to_string());

        ActionOutcome {
            points_awarded,
            level_up,
            badge_earned,
        }
    }

    /// Write the current progress now instead of waiting for the window
    pub async fn flush(&self) {
        self.inner.persister.flush().await;
    }

    /// Settle pending bonuses and write everything out.
    ///
    /// With `flush_pending_bonuses` off, bonuses that have not fired yet are
    /// dropped, as they would be if the engine were simply discarded.
    pub async fn shutdown(&self) {
        let level_ups = {
            let mut state = self.state();
            let pending = std::mem::take(&mut state.pending_bonuses);
            let mut level_ups = Vec::new();
            if self.inner.settings.flush_pending_bonuses {
                let bonus = self.bonus_delta();
                for _ in &pending {
                    level_ups.extend(self.apply_points(&mut state, bonus));
                }
            } else if !pending.is_empty() {
                tracing::debug!(user = %self.inner.user_id, dropped = pending.len(), "Dropping pending badge bonuses");
            }
            level_ups
        };

        for level_up in level_ups {
            self.announce_level_up(level_up);
        }
        self.flush().await;
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bonus_delta(&self) -> i64 {
        i64::try_from(self.inner.settings.badge_bonus_points).unwrap_or(i64::MAX)
    }

    /// Mutate the balance inside an already held lock
    fn apply_points(&self, state: &mut EngineState, delta: i64) -> Option<LevelUp> {
        let points = if delta >= 0 {
            state.points.saturating_add(delta.unsigned_abs())
        } else {
            state.points.saturating_sub(delta.unsigned_abs())
        };
        self.set_points(state, points)
    }

    fn set_points(&self, state: &mut EngineState, points: u64) -> Option<LevelUp> {
        let old_level = Level::for_points(state.points);
        state.points = points;
        let new_level = Level::for_points(state.points);
        self.publish(state);

        (new_level > old_level).then_some(LevelUp {
            old_level,
            new_level,
        })
    }

    fn apply_badge_bonus(&self, badge_id: &str) {
        let level_up = {
            let mut state = self.state();
            // Gone means shutdown already settled it
            let Some(pos) = state.pending_bonuses.iter().position(|b| b == badge_id) else {
                return;
            };
            state.pending_bonuses.remove(pos);
            let bonus = self.bonus_delta();
            self.apply_points(&mut state, bonus)
        };

        tracing::debug!(user = %self.inner.user_id, badge = badge_id, "Badge bonus applied");
        if let Some(level_up) = level_up {
            self.announce_level_up(level_up);
        }
    }

    fn publish(&self, state: &EngineState) {
        let record = ProgressRecord {
            level: Level::for_points(state.points),
            points: state.points,
            badges: state.badges.to_vec(),
        };
        self.inner.persister.schedule(record);
        self.inner
            .snapshots
            .send_replace(ProgressSnapshot::new(state.points, &state.badges));
    }

    fn announce_level_up(&self, level_up: LevelUp) {
        tracing::info!(
            user = %self.inner.user_id,
            old_level = level_up.old_level,
            new_level = level_up.new_level,
            "Level up"
        );
        self.announce(AchievementEvent::level_up(&level_up), level_up.is_large_jump());
    }

    /// Every achievement comes with confetti
    fn announce(&self, event: AchievementEvent, large_jump: bool) {
        self.inner.sink.show_achievement(&event);
        self.inner
            .sink
            .trigger_confetti(&ConfettiTrigger::for_intensity(large_jump));
    }
}

fn apply_deferred_bonus(engine: Weak<Inner>, badge_id: &str) {
    match engine.upgrade() {
        Some(inner) => GamificationEngine { inner }.apply_badge_bonus(badge_id),
        None => tracing::debug!(badge = badge_id, "Engine discarded before badge bonus fired"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::events::AchievementKind;
    use crate::gamification::sink::{ChannelSink, PresentationEvent};
    use crate::store::MemoryProgressStore;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn engine_with(
        store: Arc<MemoryProgressStore>,
        settings: EngineSettings,
    ) -> (GamificationEngine, UnboundedReceiver<PresentationEvent>) {
        let (sink, rx) = ChannelSink::new();
        let engine = GamificationEngine::load("user", store, Arc::new(sink), settings);
        (engine, rx)
    }

    fn achievements(rx: &mut UnboundedReceiver<PresentationEvent>) -> Vec<AchievementEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PresentationEvent::Achievement(a) = event {
                events.push(a);
            }
        }
        events
    }

    fn confetti(rx: &mut UnboundedReceiver<PresentationEvent>) -> Vec<ConfettiTrigger> {
        let mut triggers = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PresentationEvent::Confetti(c) = event {
                triggers.push(c);
            }
        }
        triggers
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_engine_add_points_levels_up_and_persists() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, mut rx) = engine_with(store.clone(), EngineSettings::default());

        let level_up = engine.add_points(50);

        assert_eq!(engine.level(), 2);
        assert_eq!(level_up, Some(LevelUp { old_level: 1, new_level: 2 }));
        let events = achievements(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AchievementKind::Milestone);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let record = store.record("user").unwrap();
        assert_eq!(record.points, 50);
        assert_eq!(record.level, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_event_without_threshold_crossing() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, mut rx) = engine_with(store, EngineSettings::default());

        assert!(engine.add_points(10).is_none());
        assert!(engine.add_points(39).is_none());
        assert!(achievements(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_large_jump_uses_large_confetti() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, mut rx) = engine_with(store, EngineSettings::default());

        let level_up = engine.add_points(850).unwrap();

        assert!(level_up.new_level >= 8);
        assert!(level_up.is_large_jump());
        assert_eq!(confetti(&mut rx), vec![ConfettiTrigger::LARGE_JUMP]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_badge_bonus_is_deferred() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, mut rx) = engine_with(store.clone(), EngineSettings::default());

        assert!(engine.earn_badge("first-client"));
        assert_eq!(engine.badges(), vec!["first-client"]);
        assert_eq!(engine.points(), 0);

        let events = achievements(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AchievementKind::Success);

        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(engine.points(), 200);
        assert_eq!(engine.level(), 3);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let record = store.record("user").unwrap();
        assert_eq!(record.points, 200);
        assert_eq!(record.badges, vec!["first-client"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_earn_badge_twice_grants_one_bonus() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store, EngineSettings::default());

        assert!(engine.earn_badge("x"));
        assert!(!engine.earn_badge("x"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.badges(), vec!["x"]);
        assert_eq!(engine.points(), 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_bonus_when_delay_is_zero() {
        let store = Arc::new(MemoryProgressStore::new());
        let settings = EngineSettings::default().with_badge_bonus_delay(Duration::ZERO);
        let (engine, _rx) = engine_with(store, settings);

        engine.earn_badge("x");
        assert_eq!(engine.points(), 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_applies_pending_bonus_once() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store.clone(), EngineSettings::default());

        engine.earn_badge("x");
        engine.shutdown().await;
        assert_eq!(engine.points(), 200);
        assert_eq!(store.record("user").unwrap().points, 200);

        // The deferred task must not apply it a second time
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.points(), 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_can_drop_pending_bonus() {
        let store = Arc::new(MemoryProgressStore::new());
        let settings = EngineSettings::default().with_flush_pending_bonuses(false);
        let (engine, _rx) = engine_with(store.clone(), settings);

        engine.earn_badge("x");
        engine.shutdown().await;

        let record = store.record("user").unwrap();
        assert_eq!(record.points, 0);
        assert_eq!(record.badges, vec!["x"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_engine_loses_pending_write() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store.clone(), EngineSettings::default());

        engine.add_points(30);
        drop(engine);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(store.record("user").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_points_clamp_at_zero() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store, EngineSettings::default());

        engine.add_points(40);
        assert!(engine.add_points(-100).is_none());
        assert_eq!(engine.points(), 0);
        assert_eq!(engine.level(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redeem_checks_balance() {
        let store = Arc::new(MemoryProgressStore::new().with_progress("user", 300, &[]));
        let (engine, _rx) = engine_with(store, EngineSettings::default());

        assert_eq!(engine.redeem(100), Ok(200));
        assert_eq!(
            engine.redeem(500),
            Err(GamificationError::InsufficientPoints {
                available: 200,
                requested: 500
            })
        );
        assert_eq!(engine.points(), 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redeem_cost_beyond_i64_range() {
        let store = Arc::new(MemoryProgressStore::new().with_progress("user", u64::MAX, &[]));
        let (engine, _rx) = engine_with(store.clone(), EngineSettings::default());
        let cost = i64::MAX as u64 + 10;
        let remaining = u64::MAX - cost;

        assert_eq!(engine.redeem(cost), Ok(remaining));
        assert_eq!(engine.points(), remaining);
        assert_eq!(engine.subscribe().borrow().points, remaining);

        engine.flush().await;
        let record = store.record("user").unwrap();
        assert_eq!(record.points, remaining);
        assert_eq!(record.level, Level::for_points(remaining));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_point_totals_keep_leveling() {
        let (engine, _rx) = engine_with(Arc::new(MemoryProgressStore::new()), EngineSettings::default());

        let level_up = engine.add_points(858_993_458_600).unwrap();
        assert_eq!(level_up.old_level, 1);
        assert_eq!(level_up.new_level, u32::MAX);
        assert_eq!(engine.add_points(i64::MAX), None);
        assert_eq!(engine.level(), u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_existing_progress() {
        let store = Arc::new(MemoryProgressStore::new().with_progress("user", 420, &["big-deal"]));
        let (engine, _rx) = engine_with(store, EngineSettings::default());

        assert_eq!(engine.points(), 420);
        assert_eq!(engine.level(), 5);
        assert!(engine.has_badge("big-deal"));
        // Known badges do not grant their bonus again
        assert!(!engine.earn_badge("big-deal"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_action_grants_first_badge_once() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store, EngineSettings::default());

        let first = engine.record_action(BusinessAction::AddClient);
        let second = engine.record_action(BusinessAction::AddClient);

        assert_eq!(first.points_awarded, 10);
        assert_eq!(first.badge_earned.as_deref(), Some("first-client"));
        assert_eq!(second.badge_earned, None);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.points(), 220);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_badge_before_points() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store, EngineSettings::default());
        let mut snapshots = engine.subscribe();

        engine.earn_badge("first-quote");
        snapshots.changed().await.unwrap();
        let after_badge = snapshots.borrow_and_update().clone();
        assert_eq!(after_badge.badges, vec!["first-quote"]);
        assert_eq!(after_badge.points, 0);

        snapshots.changed().await.unwrap();
        assert_eq!(snapshots.borrow().points, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_add_points_are_not_lost() {
        let store = Arc::new(MemoryProgressStore::new());
        let (engine, _rx) = engine_with(store, EngineSettings::default());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    engine.add_points(1);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(engine.points(), 200);
    }
}
