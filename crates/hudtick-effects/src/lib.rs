//! Active effect feed parser.
//!
//! The host hands the feed one snapshot of footer text per refresh: the
//! raw text with formatting codes, and the same text with the codes
//! stripped. The feed rebuilds its potion and power-up lists from scratch
//! on every update.
//!
//! # Modules
//!
//! - [`feed`] -- [`EffectFeed`] and the static preview entries.
//! - [`format`] -- Formatting-code stripping.
//! - [`roman`] -- Roman-numeral to integer rewriting.
//! - [`error`] -- [`EffectsError`].
//!
//! [`EffectFeed`]: feed::EffectFeed
//! [`EffectsError`]: error::EffectsError

pub mod error;
pub mod feed;
pub mod format;
pub mod roman;

pub use error::EffectsError;
pub use feed::{EffectFeed, GOD_POTION_EFFECT_COUNT, dummy_potion_timers, dummy_powerup_timers};
pub use format::strip_formatting;
pub use roman::RomanNumerals;
