//! Tick clock for the scheduler.
//!
//! The clock is the single source of truth for "now" inside the scheduler.
//! It starts at tick 0 and is advanced by exactly one per start-of-tick
//! pulse. All tick arithmetic is checked; the counter never wraps.

/// Number of host ticks in one second.
pub const TICKS_PER_SECOND: u64 = 20;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickClock {
    /// Current tick number (0 before the first pulse).
    tick: u64,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an explicit tick (useful for testing).
    pub const fn at(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The absolute tick lying `ticks` after the current one.
    pub const fn offset(&self, ticks: u64) -> Option<u64> {
        self.tick.checked_add(ticks)
    }
}

/// Convert whole seconds to ticks, or `None` on overflow.
pub const fn ticks_for_seconds(seconds: u64) -> Option<u64> {
    seconds.checked_mul(TICKS_PER_SECOND)
}
