//! Engine binary for hudtick.
//!
//! Wires the scheduler, the HUD actions, and the effect feed to a 20 Hz
//! pulse loop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hudtick-config.yaml` (or `HUDTICK_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared scheduler and bind HUD actions
//! 4. Build the footer refresher around the effect feed
//! 5. Queue the startup update check
//! 6. Start reading operator commands from stdin
//! 7. Run the pulse loop until the tick limit or `quit`

mod error;
mod footer;
mod hud;
mod operator;

use std::sync::Arc;

use hudtick_core::config::HudConfig;
use hudtick_core::runner::{self, PulseControl};
use hudtick_core::scheduler::Scheduler;
use hudtick_core::shared::SharedScheduler;
use hudtick_types::CommandKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::footer::FooterRefresh;
use crate::hud::SharedHud;

/// Seconds after startup before the first update check.
const STARTUP_UPDATE_CHECK_SECONDS: i64 = 5;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the effect feed, or the pulse loop
/// fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration (before logging, which reads its level).
    let config_path = HudConfig::default_path();
    let config = HudConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging.
    let level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        warning_seconds = config.scheduler.warning_seconds,
        repeat_warning = config.scheduler.repeat_full_inventory_warning,
        replace_roman_numerals = config.effects.replace_roman_numerals,
        tick_interval_ms = config.engine.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Scheduler and HUD actions.
    let scheduler = SharedScheduler::new(Scheduler::new(&config.scheduler));
    let hud = SharedHud::default();
    let mut actions = hud::action_table(&config.scheduler, &hud);

    // 4. Effect feed.
    let mut footer = FooterRefresh::new(&config.effects, Arc::clone(&hud))?;
    info!(footer_path = ?config.effects.footer_path, "Effect feed ready");

    // 5. Startup update check.
    let tick = scheduler.schedule(
        CommandKind::CheckForUpdate,
        STARTUP_UPDATE_CHECK_SECONDS,
        None,
    )?;
    info!(tick, "Update check queued");

    // 6. Operator commands.
    let control = Arc::new(PulseControl::from_config(&config.engine));
    tokio::spawn(operator::read_stdin(scheduler.clone(), Arc::clone(&control)));

    // 7. Pulse loop.
    let result = runner::run_pulses(&scheduler, &mut actions, &control, &mut footer).await?;

    info!(
        reason = ?result.end_reason,
        pulses = result.pulses,
        last_tick = result.last_tick,
        pending = scheduler.with(|s| s.len())?,
        effect_count = footer.feed().effect_count(),
        "Engine stopped"
    );
    Ok(())
}
