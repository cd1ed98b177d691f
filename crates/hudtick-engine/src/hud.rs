//! HUD state and the actions bound to each command kind.
//!
//! Rendering is out of scope here; the HUD is a small state record that
//! actions mutate and the footer callback reports on.

use std::sync::{Arc, Mutex, MutexGuard};

use hudtick_core::config::SchedulerConfig;
use hudtick_core::dispatch::{ActionError, ActionTable};
use hudtick_core::warning::FullInventoryWarning;
use hudtick_types::CommandKind;
use tracing::{info, warn};

/// Title shown by the full-inventory warning.
pub const FULL_INVENTORY_TITLE: &str = "FULL_INVENTORY";

/// On-screen state driven by scheduled commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudState {
    /// Whether the player is in a world where warnings apply.
    pub in_game: bool,
    /// Title feature currently shown.
    pub title: Option<String>,
    /// Subtitle feature currently shown.
    pub subtitle: Option<String>,
    /// Whether the update message has been shown and dismissed.
    pub update_message_displayed: bool,
    /// Number of update checks run.
    pub update_checks: u32,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            in_game: true,
            title: None,
            subtitle: None,
            update_message_displayed: false,
            update_checks: 0,
        }
    }
}

/// Shared handle to the HUD state.
pub type SharedHud = Arc<Mutex<HudState>>;

fn lock(hud: &SharedHud, kind: CommandKind) -> Result<MutexGuard<'_, HudState>, ActionError> {
    hud.lock().map_err(|_poisoned| ActionError::Failed {
        kind,
        message: "HUD state lock poisoned".to_owned(),
    })
}

/// Bind every command kind to an action on `hud`.
pub fn action_table(config: &SchedulerConfig, hud: &SharedHud) -> ActionTable {
    let mut table = ActionTable::new();

    let h = Arc::clone(hud);
    table.bind(CommandKind::ResetTitle, move |_, inv| {
        lock(&h, inv.kind)?.title = None;
        Ok(())
    });

    let h = Arc::clone(hud);
    table.bind(CommandKind::ResetSubtitle, move |_, inv| {
        lock(&h, inv.kind)?.subtitle = None;
        Ok(())
    });

    let h = Arc::clone(hud);
    table.bind(CommandKind::EraseUpdateMessage, move |_, inv| {
        lock(&h, inv.kind)?.update_message_displayed = true;
        Ok(())
    });

    let h = Arc::clone(hud);
    table.bind(CommandKind::CheckForUpdate, move |_, inv| {
        let mut state = lock(&h, inv.kind)?;
        state.update_checks = state.update_checks.saturating_add(1);
        info!(tick = inv.tick, checks = state.update_checks, args = ?inv.args, "Checking for update");
        Ok(())
    });

    let active = Arc::clone(hud);
    let shown = Arc::clone(hud);
    let warning = FullInventoryWarning::new(
        config,
        move || active.lock().is_ok_and(|state| state.in_game),
        move || match shown.lock() {
            Ok(mut state) => {
                state.title = Some(FULL_INVENTORY_TITLE.to_owned());
                warn!("Inventory full");
            }
            Err(_poisoned) => warn!("HUD state lock poisoned, warning not shown"),
        },
    );
    table.bind_boxed(CommandKind::ShowFullInventoryWarning, warning.into_action());

    table
}
