//! Effect feed refresh, run as the pulse callback.
//!
//! Every `refresh_interval_ticks` the footer file is re-read and handed to
//! the effect feed. A missing or unreadable file counts as "no footer
//! this cycle", which empties the feed.

use std::path::PathBuf;

use hudtick_core::config::EffectsConfig;
use hudtick_core::runner::PulseCallback;
use hudtick_core::scheduler::PulseSummary;
use hudtick_effects::{EffectFeed, EffectsError, dummy_potion_timers, dummy_powerup_timers};
use hudtick_types::EffectEntry;
use tracing::{debug, info};

use crate::hud::SharedHud;

/// Pulse callback that keeps the effect feed current.
#[derive(Debug)]
pub struct FooterRefresh {
    feed: EffectFeed,
    footer_path: Option<PathBuf>,
    refresh_interval_ticks: u64,
    hud: SharedHud,
}

impl FooterRefresh {
    /// Build the refresher from the effects config.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError`] if the feed patterns fail to compile.
    pub fn new(config: &EffectsConfig, hud: SharedHud) -> Result<Self, EffectsError> {
        Ok(Self {
            feed: EffectFeed::new(config.replace_roman_numerals)?,
            footer_path: config.footer_path.clone(),
            refresh_interval_ticks: config.refresh_interval_ticks,
            hud,
        })
    }

    /// The feed as of the last refresh.
    pub const fn feed(&self) -> &EffectFeed {
        &self.feed
    }

    /// Entries to draw: the live lists, or the preview placeholders when
    /// nothing is active.
    pub fn display_entries(&self) -> (&[EffectEntry], &[EffectEntry]) {
        if self.feed.is_empty() {
            (dummy_potion_timers(), dummy_powerup_timers())
        } else {
            (self.feed.potion_timers(), self.feed.powerup_timers())
        }
    }

    fn read_footer(&self) -> Option<String> {
        let path = self.footer_path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Footer unavailable");
                None
            }
        }
    }

    /// Refresh the feed now.
    pub fn refresh(&mut self) {
        let footer = self.read_footer();
        self.feed.update_from_raw(footer.as_deref());
    }
}

impl PulseCallback for FooterRefresh {
    fn on_pulse(&mut self, summary: &PulseSummary) {
        let due = summary
            .tick
            .checked_rem(self.refresh_interval_ticks)
            .is_some_and(|r| r == 0);
        if !due {
            return;
        }

        self.refresh();
        let title = self
            .hud
            .lock()
            .ok()
            .and_then(|state| state.title.clone());
        info!(
            tick = summary.tick,
            potions = self.feed.potion_timers().len(),
            powerups = self.feed.powerup_timers().len(),
            effect_count = self.feed.effect_count(),
            title = ?title,
            "HUD refreshed"
        );
        let (potions, powerups) = self.display_entries();
        debug!(?potions, ?powerups, "Effect timers");
    }
}
