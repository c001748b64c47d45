//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use bizquest::config::Config;

/// Default configuration content for bizquest init
pub const DEFAULT_CONFIG: &str = r#"# bizquest configuration
# ======================
#
# Available options:
#   persist_debounce_ms  - Quiet period before progress is written (default: 500)
#   badge_bonus_delay_ms - Delay between a badge and its bonus points, 0 = immediate (default: 500)
#   badge_bonus_points   - Points for every new badge (default: 200)
#   flush_on_shutdown    - Apply pending badge bonuses on exit instead of dropping them (default: true)
#   database_path        - Progress database (default: ~/.bizquest/progress.db)
#   default_user         - User when --user is not given (default: "local")

[settings]
persist_debounce_ms = 500
badge_bonus_delay_ms = 500
badge_bonus_points = 200
flush_on_shutdown = true
# database_path = "/path/to/progress.db"
default_user = "local"
"#;

pub async fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    Config::write_file(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
