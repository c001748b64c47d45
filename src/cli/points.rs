//! Point commands: add, redeem, record action

use anyhow::{bail, Result};

use bizquest::gamification::BusinessAction;

use super::{print_summary, CliContext};

pub async fn add_points_command(ctx: &CliContext, delta: i64) -> Result<()> {
    let engine = ctx.engine();
    engine.add_points(delta);
    engine.shutdown().await;
    print_summary(&engine);
    Ok(())
}

pub async fn redeem_command(ctx: &CliContext, cost: u64) -> Result<()> {
    let engine = ctx.engine();
    let result = engine.redeem(cost);
    engine.shutdown().await;

    let remaining = result?;
    println!("Redeemed {} points, {} left.", cost, remaining);
    Ok(())
}

pub async fn record_command(ctx: &CliContext, action: &str) -> Result<()> {
    let Some(action) = BusinessAction::from_str(action) else {
        let known: Vec<&str> = BusinessAction::all().iter().map(|a| a.as_str()).collect();
        bail!("Unknown action: {} (known: {})", action, known.join(", "));
    };

    let engine = ctx.engine();
    let outcome = engine.record_action(action);
    if outcome.badge_earned.is_some() {
        super::badge::wait_for_bonus(ctx).await;
    }
    engine.shutdown().await;

    println!("+{} points for {}", outcome.points_awarded, action.as_str());
    print_summary(&engine);
    Ok(())
}
