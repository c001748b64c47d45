//! Point and level system
//!
//! Defines level thresholds and derives the level for a point total.

/// Level definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub level: u32,
    pub min_points: u64,
}

/// Explicit level thresholds (must be sorted by level)
pub static LEVELS: &[Level] = &[
    Level {
        level: 1,
        min_points: 0,
    },
    Level {
        level: 2,
        min_points: 50,
    },
    Level {
        level: 3,
        min_points: 150,
    },
    Level {
        level: 4,
        min_points: 250,
    },
    Level {
        level: 5,
        min_points: 400,
    },
    Level {
        level: 6,
        min_points: 600,
    },
    Level {
        level: 7,
        min_points: 800,
    },
];

/// Point total where the table ends and extrapolated levels begin
pub const EXTRAPOLATION_START: u64 = 800;

/// Points per extrapolated level
pub const EXTRAPOLATION_STEP: u64 = 200;

impl Level {
    /// Level for a point total.
    ///
    /// Below [`EXTRAPOLATION_START`] the table applies; from there on every
    /// [`EXTRAPOLATION_STEP`] points add one level, starting at level 8.
    pub fn for_points(points: u64) -> u32 {
        if points >= EXTRAPOLATION_START {
            let steps = (points - EXTRAPOLATION_START) / EXTRAPOLATION_STEP;
            return u32::try_from(steps).unwrap_or(u32::MAX).saturating_add(8);
        }

        LEVELS
            .iter()
            .rev()
            .find(|l| points >= l.min_points)
            .map(|l| l.level)
            .unwrap_or(1)
    }

    /// Lowest point total that yields `level`.
    ///
    /// Level 7 shares its threshold with level 8, so no point total maps
    /// to it once extrapolation takes over.
    pub fn threshold(level: u32) -> u64 {
        match level {
            0 | 1 => 0,
            l if l <= 7 => LEVELS[(l - 1) as usize].min_points,
            l => EXTRAPOLATION_START + u64::from(l - 8) * EXTRAPOLATION_STEP,
        }
    }

    /// Points needed to reach the level after `current_level`
    pub fn points_for_next(current_level: u32) -> u64 {
        Self::threshold(current_level.saturating_add(1))
    }
}

/// Derived progress numbers for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub points: u64,
    pub level: u32,
    /// Points where the current level starts
    pub current_level_points: u64,
    /// Points where the next level starts
    pub next_level_points: u64,
}

impl LevelProgress {
    pub fn new(points: u64) -> Self {
        let level = Level::for_points(points);
        Self {
            points,
            level,
            current_level_points: Level::threshold(level),
            next_level_points: Level::points_for_next(level),
        }
    }

    /// Progress to the next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        let span = self.next_level_points.saturating_sub(self.current_level_points);
        if span == 0 {
            return 1.0;
        }
        let in_level = self.points.saturating_sub(self.current_level_points);
        (in_level as f32 / span as f32).min(1.0)
    }

    /// Points still missing for the next level
    pub fn points_remaining(&self) -> u64 {
        self.next_level_points.saturating_sub(self.points)
    }
}
