//! CLI command implementations

pub mod badge;
pub mod init;
pub mod levels;
pub mod points;
pub mod status;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bizquest::config::Config;
use bizquest::gamification::{ConsoleSink, EngineSettings, GamificationEngine};
use bizquest::store::SqliteProgressStore;

/// Everything a command needs: config, user and an open store
pub struct CliContext {
    pub config: Config,
    pub user: String,
    pub store: Arc<SqliteProgressStore>,
}

impl CliContext {
    pub fn open(config_path: Option<&Path>, db: Option<PathBuf>, user: Option<String>) -> Result<Self> {
        let config = Config::load_from(config_path)?;
        let db_path = db.unwrap_or_else(|| config.database_path());
        let store = SqliteProgressStore::open(&db_path)
            .with_context(|| format!("Failed to open progress db: {}", db_path.display()))?;
        let user = user.unwrap_or_else(|| config.settings.default_user.clone());

        tracing::debug!(user = %user, db = %db_path.display(), "CLI context ready");

        Ok(Self {
            config,
            user,
            store: Arc::new(store),
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::from(&self.config.settings)
    }

    /// Engine for the context user, announcing achievements on stdout
    pub fn engine(&self) -> GamificationEngine {
        GamificationEngine::load(
            self.user.clone(),
            self.store.clone(),
            Arc::new(ConsoleSink),
            self.engine_settings(),
        )
    }
}

/// One-line summary after a mutation
pub fn print_summary(engine: &GamificationEngine) {
    let snapshot = engine.snapshot();
    println!(
        "{}: {} points, level {} ({} to next level)",
        engine.user_id(),
        snapshot.points,
        snapshot.level,
        snapshot.next_level_points.saturating_sub(snapshot.points)
    );
}
