//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// General settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Quiet period (ms) before a burst of point changes is written to the store
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// Delay (ms) between a badge grant and its point bonus.
    /// 0 applies the bonus immediately.
    #[serde(default = "default_badge_bonus_delay_ms")]
    pub badge_bonus_delay_ms: u64,

    /// Points granted for every newly earned badge
    #[serde(default = "default_badge_bonus_points")]
    pub badge_bonus_points: u64,

    /// Apply badge bonuses that have not fired yet when shutting down.
    /// When false they are dropped.
    #[serde(default = "default_flush_on_shutdown")]
    pub flush_on_shutdown: bool,

    /// Progress database location (defaults to ~/.bizquest/progress.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// User id used when the CLI is not given one
    #[serde(default = "default_user")]
    pub default_user: String,
}

fn default_persist_debounce_ms() -> u64 {
    500
}

fn default_badge_bonus_delay_ms() -> u64 {
    500
}

fn default_badge_bonus_points() -> u64 {
    200
}

fn default_flush_on_shutdown() -> bool {
    true
}

fn default_user() -> String {
    "local".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            persist_debounce_ms: default_persist_debounce_ms(),
            badge_bonus_delay_ms: default_badge_bonus_delay_ms(),
            badge_bonus_points: default_badge_bonus_points(),
            flush_on_shutdown: default_flush_on_shutdown(),
            database_path: None,
            default_user: default_user(),
        }
    }
}
