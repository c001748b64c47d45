//! Gamification system: points, levels and badges
//!
//! Business actions award points, points derive a level, and one-time
//! badges grant a fixed bonus. Achievement notifications go to a
//! presentation sink; progress goes to a [`ProgressStore`](crate::store::ProgressStore)
//! through a debounced writer.

mod badges;
mod engine;
mod events;
mod levels;
mod persist;
mod registry;
mod rewards;
mod sink;

pub use badges::{badge_title, BadgeId, BadgeSet};
pub use engine::{
    ActionOutcome, EngineSettings, GamificationEngine, GamificationError, ProgressSnapshot,
};
pub use events::{AchievementEvent, AchievementKind, ConfettiTrigger, LevelUp};
pub use levels::{Level, LevelProgress, LEVELS};
pub use registry::EngineRegistry;
pub use rewards::{BusinessAction, PointRewards};
pub use sink::{ChannelSink, ConsoleSink, NullSink, PresentationEvent, PresentationSink};
