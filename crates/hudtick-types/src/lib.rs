//! Shared type definitions for the hudtick workspace.
//!
//! These types cross the boundary between the scheduler, the effect feed,
//! and the host engine. They carry no behavior beyond parsing and display.
//!
//! # Modules
//!
//! - [`enums`] -- Command kinds, tick phases, and effect categories
//! - [`structs`] -- Effect entries and command argument payloads

pub mod enums;
pub mod structs;

pub use enums::{CommandKind, EffectCategory, ParseKindError, TickPhase};
pub use structs::{CommandArgs, EffectEntry};
