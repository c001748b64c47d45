//! Achievement notifications handed to the presentation layer

use serde::Serialize;

use super::badges::badge_title;

/// Kind of achievement notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Success,
    Milestone,
    Streak,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Milestone => "milestone",
            Self::Streak => "streak",
        }
    }
}

/// Ephemeral notification produced by level-ups and badge grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementEvent {
    pub title: String,
    pub message: String,
    pub kind: AchievementKind,
}

impl AchievementEvent {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: AchievementKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn level_up(level_up: &LevelUp) -> Self {
        Self::new(
            "Level Up!",
            format!("You reached level {}", level_up.new_level),
            AchievementKind::Milestone,
        )
    }

    pub fn badge_earned(badge_id: &str) -> Self {
        Self::new(
            "Badge Unlocked!",
            format!("You earned the \"{}\" badge", badge_title(badge_id)),
            AchievementKind::Success,
        )
    }
}

/// A level transition caused by a single point change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
}

impl LevelUp {
    /// More than one level crossed in a single change
    pub fn is_large_jump(&self) -> bool {
        self.new_level - self.old_level > 1
    }
}

/// Confetti parameters for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfettiTrigger {
    pub duration_ms: u64,
    pub particle_count: u32,
    /// Normalized screen point (0.0 - 1.0) to burst from
    pub focus_point: Option<(f32, f32)>,
}

impl ConfettiTrigger {
    pub const STANDARD: Self = Self {
        duration_ms: 3_000,
        particle_count: 100,
        focus_point: None,
    };

    pub const LARGE_JUMP: Self = Self {
        duration_ms: 5_000,
        particle_count: 250,
        focus_point: Some((0.5, 0.3)),
    };

    pub fn for_intensity(large_jump: bool) -> Self {
        if large_jump {
            Self::LARGE_JUMP
        } else {
            Self::STANDARD
        }
    }
}
