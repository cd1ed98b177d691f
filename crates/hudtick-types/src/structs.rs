//! Plain data structs shared across the workspace.

use serde::{Deserialize, Serialize};

/// Argument list recorded for one invocation of a scheduled command.
pub type CommandArgs = Vec<serde_json::Value>;

/// One active potion effect or power-up and its countdown.
///
/// Entries are rebuilt from scratch every feed cycle; none survives
/// between cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectEntry {
    /// Display label, formatting codes included (e.g. `"§r§eSpeed II "`).
    pub label: String,
    /// Remaining time as shown in the footer (`H:MM:SS`, `MM:SS`, ...).
    pub remaining_time: String,
}

impl EffectEntry {
    /// Create an entry from a label and its remaining-time string.
    pub fn new(label: impl Into<String>, remaining_time: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            remaining_time: remaining_time.into(),
        }
    }
}
