//! Status and reset commands

use anyhow::{Context, Result};

use bizquest::gamification::{badge_title, Level, ProgressSnapshot};
use bizquest::store::ProgressStore;

use super::CliContext;

/// Show points, level and badges of the context user
pub async fn status_command(ctx: &CliContext, json: bool) -> Result<()> {
    let engine = ctx.engine();
    let snapshot = engine.snapshot();

    if json {
        let out = serde_json::to_string_pretty(&snapshot).context("Failed to serialize status")?;
        println!("{}", out);
        return Ok(());
    }

    println!("User:   {}", engine.user_id());
    println!("Points: {}", snapshot.points);
    println!("{}", level_line(&snapshot));

    if snapshot.badges.is_empty() {
        println!("Badges: none yet");
    } else {
        println!("Badges ({}):", snapshot.badges.len());
        for badge in &snapshot.badges {
            println!("  - {} ({})", badge_title(badge), badge);
        }
    }

    Ok(())
}

/// Level line of the status output. Names the level actually reached at
/// `next_level_points`, which skips 7.
fn level_line(snapshot: &ProgressSnapshot) -> String {
    format!(
        "Level:  {} ({:.0}% to level {}, {} points needed)",
        snapshot.level,
        snapshot.progress_to_next * 100.0,
        Level::for_points(snapshot.next_level_points),
        snapshot.next_level_points.saturating_sub(snapshot.points)
    )
}

/// Delete all stored progress of the context user
pub fn reset_command(ctx: &CliContext) -> Result<()> {
    ctx.store
        .reset(&ctx.user)
        .with_context(|| format!("Failed to reset progress for {}", ctx.user))?;
    println!("Progress of {} reset.", ctx.user);
    Ok(())
}
