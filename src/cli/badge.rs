//! Badge commands

use anyhow::Result;

use bizquest::gamification::BadgeId;

use super::{print_summary, CliContext};

/// With flushing disabled, shutdown would drop a pending bonus,
/// so give it the time to fire on its own.
pub(super) async fn wait_for_bonus(ctx: &CliContext) {
    let settings = ctx.engine_settings();
    if !settings.flush_pending_bonuses {
        tokio::time::sleep(settings.badge_bonus_delay).await;
    }
}

pub async fn earn_badge_command(ctx: &CliContext, badge_id: &str) -> Result<()> {
    let engine = ctx.engine();

    if engine.earn_badge(badge_id) {
        wait_for_bonus(ctx).await;
    } else {
        println!("Badge {} already earned.", badge_id);
    }
    engine.shutdown().await;

    print_summary(&engine);
    Ok(())
}

/// List the badge catalog plus any custom badges the user holds
pub async fn badges_command(ctx: &CliContext) -> Result<()> {
    let engine = ctx.engine();

    for badge in BadgeId::all() {
        let mark = if engine.has_badge(badge.as_str()) { "x" } else { " " };
        println!(
            "[{}] {:<18} {:<16} {}",
            mark,
            badge.as_str(),
            badge.title(),
            badge.description()
        );
    }

    let custom: Vec<String> = engine
        .badges()
        .into_iter()
        .filter(|b| BadgeId::from_str(b).is_none())
        .collect();
    if !custom.is_empty() {
        println!("\nCustom badges:");
        for badge in custom {
            println!("[x] {}", badge);
        }
    }

    Ok(())
}
