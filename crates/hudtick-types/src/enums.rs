//! Enumeration types shared across the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command kinds
// ---------------------------------------------------------------------------

/// Tag identifying which host-bound action a scheduled entry invokes.
///
/// The scheduler never interprets a kind beyond equality; behavior is bound
/// by the host through a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Clear the title feature currently shown on screen.
    ResetTitle,
    /// Clear the subtitle feature currently shown on screen.
    ResetSubtitle,
    /// Mark the update message as already displayed.
    EraseUpdateMessage,
    /// Show the full-inventory warning (may reschedule itself).
    ShowFullInventoryWarning,
    /// Run an update check.
    CheckForUpdate,
}

impl CommandKind {
    /// Every command kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ResetTitle,
        Self::ResetSubtitle,
        Self::EraseUpdateMessage,
        Self::ShowFullInventoryWarning,
        Self::CheckForUpdate,
    ];

    /// The `snake_case` name used in config files and operator commands.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResetTitle => "reset_title",
            Self::ResetSubtitle => "reset_subtitle",
            Self::EraseUpdateMessage => "erase_update_message",
            Self::ShowFullInventoryWarning => "show_full_inventory_warning",
            Self::CheckForUpdate => "check_for_update",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`CommandKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command kind: {}", self.input)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for CommandKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ParseKindError {
                input: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tick phases
// ---------------------------------------------------------------------------

/// Phase of a host tick pulse.
///
/// Hosts may deliver both phases for every tick; only [`TickPhase::Start`]
/// advances the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickPhase {
    /// Beginning of a tick.
    Start,
    /// End of a tick.
    End,
}

// ---------------------------------------------------------------------------
// Effect categories
// ---------------------------------------------------------------------------

/// Which output list a parsed effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    /// A potion effect, usually carrying a roman-numeral tier.
    Potion,
    /// A power-up, never carrying a tier.
    Powerup,
}
