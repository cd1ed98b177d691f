//! The effect feed: active potion effects and power-ups.
//!
//! Each [`EffectFeed::update`] clears both lists, then:
//!
//! 1. Scans the raw text for effect timers. Every match is either a potion
//!    (label carrying a tier) or a power-up (plain label), followed by a
//!    white countdown. Matches are appended in source order.
//! 2. Scans the normalized text for the "You have N active effects."
//!    summary. If it is absent but a God Potion is active, a God Potion
//!    entry is synthesized and the count is forced to
//!    [`GOD_POTION_EFFECT_COUNT`]. Otherwise the count is 0.
//!
//! Nothing survives from one update to the next.

use std::sync::LazyLock;

use hudtick_types::{EffectCategory, EffectEntry};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{self, EffectsError};
use crate::format::strip_formatting;
use crate::roman::RomanNumerals;

/// Effect count reported while a God Potion is active.
pub const GOD_POTION_EFFECT_COUNT: u32 = 32;

/// Label used for the synthesized God Potion entry.
pub const GOD_POTION_LABEL: &str = "§cGod Potion§r ";

/// Effect timers in the raw footer.
///
/// A potion label either ends in `§r ` after an optional tier, or ends in
/// an explicit tier word. Anything else colored and followed by a timer
/// is a power-up.
const EFFECT_PATTERN: &str = concat!(
    r"(?:(?P<potion>§r§[a-f0-9][a-zA-Z ]+ (?:I[XV]|V?I{0,3})§r ",
    r"|§r§[a-f0-9][a-zA-Z ]* (?:I[XV]|VI{0,3}|I{1,3}) )",
    r"|(?P<powerup>§r§[a-f0-9][a-zA-Z ]+ ))",
    r"§r§f(?P<timer>\d{0,2}:?\d{1,2}:\d{2})",
);

/// Summary line in the normalized footer.
const EFFECT_COUNT_PATTERN: &str = r"You have (?P<count>[0-9]+) active effects\.";

/// God Potion line in the normalized footer.
const GOD_POTION_PATTERN: &str = r"You have a God Potion active! (?P<timer>\d{0,2}:?\d{1,2}:\d{2})";

static DUMMY_POTION_TIMERS: LazyLock<Vec<EffectEntry>> = LazyLock::new(|| {
    vec![
        EffectEntry::new("§r§ePotion Effect II ", "12:34"),
        EffectEntry::new("§r§aEnchanting XP Boost III ", "1:23:45"),
    ]
});

static DUMMY_POWERUP_TIMERS: LazyLock<Vec<EffectEntry>> =
    LazyLock::new(|| vec![EffectEntry::new("§r§bHoming Snowballs ", "1:39")]);

/// Placeholder potion entries for layout previews.
pub fn dummy_potion_timers() -> &'static [EffectEntry] {
    &DUMMY_POTION_TIMERS
}

/// Placeholder power-up entries for layout previews.
pub fn dummy_powerup_timers() -> &'static [EffectEntry] {
    &DUMMY_POWERUP_TIMERS
}

/// Compiled footer patterns.
#[derive(Debug, Clone)]
struct FeedPatterns {
    effect: Regex,
    effect_count: Regex,
    god_potion: Regex,
}

impl FeedPatterns {
    fn new() -> Result<Self, EffectsError> {
        Ok(Self {
            effect: error::compile("effect", EFFECT_PATTERN)?,
            effect_count: error::compile("effect count", EFFECT_COUNT_PATTERN)?,
            god_potion: error::compile("god potion", GOD_POTION_PATTERN)?,
        })
    }
}

/// Currently active timed effects, rebuilt on every update.
#[derive(Debug, Clone)]
pub struct EffectFeed {
    patterns: FeedPatterns,
    numerals: RomanNumerals,
    /// Rewrite roman numerals in labels as entries are appended.
    replace_roman_numerals: bool,
    potion_timers: Vec<EffectEntry>,
    powerup_timers: Vec<EffectEntry>,
    effect_count: u32,
}

impl EffectFeed {
    /// Create an empty feed.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::Pattern`] if a built-in pattern is invalid.
    pub fn new(replace_roman_numerals: bool) -> Result<Self, EffectsError> {
        Ok(Self {
            patterns: FeedPatterns::new()?,
            numerals: RomanNumerals::new()?,
            replace_roman_numerals,
            potion_timers: Vec::new(),
            powerup_timers: Vec::new(),
            effect_count: 0,
        })
    }

    /// Toggle roman-numeral rewriting for subsequent updates.
    pub const fn set_replace_roman_numerals(&mut self, enabled: bool) {
        self.replace_roman_numerals = enabled;
    }

    /// Rebuild the feed from one footer snapshot.
    ///
    /// `raw` keeps formatting codes; `normalized` is the same text without
    /// them. An absent `raw` leaves the feed empty with a count of 0.
    pub fn update(&mut self, raw: Option<&str>, normalized: Option<&str>) {
        self.potion_timers.clear();
        self.powerup_timers.clear();
        self.effect_count = 0;

        let Some(raw) = raw else {
            return;
        };

        // Collect first: `put` needs `&mut self`.
        let matches: Vec<(EffectCategory, String, String)> = self
            .patterns
            .effect
            .captures_iter(raw)
            .filter_map(|caps| {
                let timer = caps.name("timer")?.as_str().to_owned();
                if let Some(potion) = caps.name("potion") {
                    Some((EffectCategory::Potion, potion.as_str().to_owned(), timer))
                } else {
                    caps.name("powerup").map(|powerup| {
                        (EffectCategory::Powerup, powerup.as_str().to_owned(), timer)
                    })
                }
            })
            .collect();
        for (category, label, timer) in matches {
            self.put(category, &label, timer);
        }

        if let Some(normalized) = normalized {
            self.read_summary(normalized);
        }

        debug!(
            potions = self.potion_timers.len(),
            powerups = self.powerup_timers.len(),
            effect_count = self.effect_count,
            "Effect feed updated"
        );
    }

    /// Rebuild the feed from raw text alone, deriving the normalized text.
    pub fn update_from_raw(&mut self, raw: Option<&str>) {
        let normalized = raw.map(strip_formatting);
        self.update(raw, normalized.as_deref());
    }

    fn read_summary(&mut self, normalized: &str) {
        if let Some(caps) = self.patterns.effect_count.captures(normalized) {
            let digits = caps.name("count").map_or("", |m| m.as_str());
            self.effect_count = digits.parse().unwrap_or_else(|e| {
                warn!(count = digits, error = %e, "Unparseable effect count, saturating");
                u32::MAX
            });
        } else if let Some(timer) = self
            .patterns
            .god_potion
            .captures(normalized)
            .and_then(|caps| caps.name("timer"))
            .map(|m| m.as_str().to_owned())
        {
            self.put(EffectCategory::Potion, GOD_POTION_LABEL, timer);
            self.effect_count = GOD_POTION_EFFECT_COUNT;
        }
    }

    /// Append an entry, rewriting numerals if enabled.
    fn put(&mut self, category: EffectCategory, label: &str, timer: String) {
        let label = if self.replace_roman_numerals {
            self.numerals.replace_numerals_with_integers(label).into_owned()
        } else {
            label.to_owned()
        };
        let entry = EffectEntry {
            label,
            remaining_time: timer,
        };
        match category {
            EffectCategory::Potion => self.potion_timers.push(entry),
            EffectCategory::Powerup => self.powerup_timers.push(entry),
        }
    }

    /// Active potion effects, in footer order.
    pub fn potion_timers(&self) -> &[EffectEntry] {
        &self.potion_timers
    }

    /// Active power-ups, in footer order.
    pub fn powerup_timers(&self) -> &[EffectEntry] {
        &self.powerup_timers
    }

    /// Entries of one category.
    pub fn effects(&self, category: EffectCategory) -> &[EffectEntry] {
        match category {
            EffectCategory::Potion => &self.potion_timers,
            EffectCategory::Powerup => &self.powerup_timers,
        }
    }

    /// Number of active effects reported by the footer.
    pub const fn effect_count(&self) -> u32 {
        self.effect_count
    }

    /// Whether both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.potion_timers.is_empty() && self.powerup_timers.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn feed() -> EffectFeed {
        EffectFeed::new(false).unwrap()
    }

    #[test]
    fn potion_with_tier_word_is_a_potion() {
        let mut f = feed();
        f.update(
            Some("§r§ePotion Effect II §r§f12:34"),
            Some("You have 1 active effects."),
        );
        assert_eq!(
            f.potion_timers(),
            [EffectEntry::new("§r§ePotion Effect II ", "12:34")]
        );
        assert!(f.powerup_timers().is_empty());
        assert_eq!(f.effect_count(), 1);
    }

    #[test]
    fn bare_five_tier_is_a_potion() {
        let mut f = feed();
        f.update(
            Some("§r§cStrength V §r§f3:00§r§aSpeed VII §r§f0:45"),
            None,
        );
        assert_eq!(
            f.potion_timers(),
            [
                EffectEntry::new("§r§cStrength V ", "3:00"),
                EffectEntry::new("§r§aSpeed VII ", "0:45"),
            ]
        );
        assert!(f.powerup_timers().is_empty());
    }

    #[test]
    fn reset_terminated_label_is_a_potion() {
        let mut f = feed();
        f.update(Some("§r§bSpeed IV§r §r§f1:00:00"), None);
        assert_eq!(
            f.potion_timers(),
            [EffectEntry::new("§r§bSpeed IV§r ", "1:00:00")]
        );
    }

    #[test]
    fn plain_label_is_a_powerup() {
        let mut f = feed();
        f.update(Some("§r§bHoming Snowballs §r§f1:39"), None);
        assert!(f.potion_timers().is_empty());
        assert_eq!(
            f.effects(EffectCategory::Powerup),
            [EffectEntry::new("§r§bHoming Snowballs ", "1:39")]
        );
    }

    #[test]
    fn god_potion_is_synthesized_without_summary() {
        let mut f = feed();
        f.update(Some(""), Some("You have a God Potion active! 5:00"));
        assert_eq!(
            f.potion_timers(),
            [EffectEntry::new(GOD_POTION_LABEL, "5:00")]
        );
        assert_eq!(f.effect_count(), GOD_POTION_EFFECT_COUNT);
    }

    #[test]
    fn summary_wins_over_god_potion() {
        let mut f = feed();
        f.update(
            Some(""),
            Some("You have 3 active effects. You have a God Potion active! 5:00"),
        );
        assert!(f.potion_timers().is_empty());
        assert_eq!(f.effect_count(), 3);
    }

    #[test]
    fn absent_raw_text_empties_everything() {
        let mut f = feed();
        f.update(
            Some("§r§ePotion Effect II §r§f12:34"),
            Some("You have 1 active effects."),
        );
        f.update(None, Some("You have 1 active effects."));
        assert!(f.is_empty());
        assert_eq!(f.effect_count(), 0);
    }

    #[test]
    fn no_summary_means_zero_count() {
        let mut f = feed();
        f.update(Some("§r§bHoming Snowballs §r§f1:39"), Some("Homing Snowballs 1:39"));
        assert_eq!(f.effect_count(), 0);
        assert_eq!(f.powerup_timers().len(), 1);
    }

    #[test]
    fn numerals_are_rewritten_when_enabled() {
        let mut f = EffectFeed::new(true).unwrap();
        f.update(Some("§r§aEnchanting XP Boost III §r§f1:23:45"), None);
        assert_eq!(
            f.potion_timers(),
            [EffectEntry::new("§r§aEnchanting XP Boost 3 ", "1:23:45")]
        );

        f.set_replace_roman_numerals(false);
        f.update(Some("§r§aEnchanting XP Boost III §r§f1:23:45"), None);
        assert_eq!(f.potion_timers()[0].label, "§r§aEnchanting XP Boost III ");
    }

    #[test]
    fn dummy_lists_are_fixed() {
        assert_eq!(dummy_potion_timers().len(), 2);
        assert_eq!(
            dummy_powerup_timers(),
            [EffectEntry::new("§r§bHoming Snowballs ", "1:39")]
        );
    }
}
