//! Async pulse loop with operator controls.
//!
//! [`run_pulses`] plays the host's tick source: it pulses a
//! [`SharedScheduler`] once per tick interval and reports each pulse to a
//! [`PulseCallback`]. The loop stops after `max_ticks` pulses or when
//! [`PulseControl::request_stop`] is called. Other tasks may schedule and
//! cancel through their own clone of the shared scheduler meanwhile.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use hudtick_types::TickPhase;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::dispatch::CommandHandler;
use crate::scheduler::PulseSummary;
use crate::shared::{SharedError, SharedScheduler};

/// Errors that can occur during the pulse loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The shared scheduler could not be used.
    #[error("shared scheduler error: {source}")]
    Shared {
        /// The underlying error.
        #[from]
        source: SharedError,
    },
}

/// Why the pulse loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Reached the configured `max_ticks`.
    MaxTicksReached,
    /// Stop was requested through [`PulseControl`].
    StopRequested,
}

/// Result of a pulse loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the loop ended.
    pub end_reason: EndReason,
    /// Number of pulses delivered.
    pub pulses: u64,
    /// Scheduler tick after the last pulse.
    pub last_tick: u64,
}

/// Shared control state for a running pulse loop.
#[derive(Debug)]
pub struct PulseControl {
    /// Set once a stop is requested.
    stop: AtomicBool,
    /// Wakes the loop out of its inter-tick sleep.
    stop_notify: Notify,
    /// Real-time milliseconds between pulses.
    tick_interval_ms: AtomicU64,
    /// Pulse limit, if any.
    max_ticks: Option<u64>,
}

impl PulseControl {
    /// Create control state.
    pub fn new(tick_interval_ms: u64, max_ticks: Option<u64>) -> Self {
        Self {
            stop: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
        }
    }

    /// Create control state from the engine config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.tick_interval_ms, config.max_ticks)
    }

    /// Ask the loop to stop after the current pulse.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Change the pulse interval at runtime.
    pub fn set_tick_interval_ms(&self, ms: u64) {
        self.tick_interval_ms.store(ms, Ordering::SeqCst);
    }

    /// Current pulse interval.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::SeqCst)
    }

    /// Pulse limit, if any.
    pub const fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }
}

/// Callback invoked after each pulse.
pub trait PulseCallback {
    /// Called after a start-of-tick pulse has been handled.
    fn on_pulse(&mut self, summary: &PulseSummary);
}

/// A no-op pulse callback.
pub struct NoOpCallback;

impl PulseCallback for NoOpCallback {
    fn on_pulse(&mut self, _summary: &PulseSummary) {}
}

/// Pulse the scheduler until the tick limit or a stop request.
///
/// # Errors
///
/// Returns [`RunnerError`] if the shared scheduler lock is poisoned.
pub async fn run_pulses(
    scheduler: &SharedScheduler,
    handler: &mut dyn CommandHandler,
    control: &PulseControl,
    callback: &mut dyn PulseCallback,
) -> Result<RunSummary, RunnerError> {
    let mut pulses: u64 = 0;
    let mut last_tick = scheduler.with(|s| s.current_tick())?;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        "Pulse loop starting"
    );

    loop {
        if control.is_stop_requested() {
            info!(pulses, last_tick, "Stop requested");
            return Ok(RunSummary {
                end_reason: EndReason::StopRequested,
                pulses,
                last_tick,
            });
        }

        if control.max_ticks().is_some_and(|max| pulses >= max) {
            info!(pulses, last_tick, "Tick limit reached");
            return Ok(RunSummary {
                end_reason: EndReason::MaxTicksReached,
                pulses,
                last_tick,
            });
        }

        // Hosts deliver both phases; only the start phase advances.
        let summary = scheduler.on_pulse(TickPhase::Start, handler)?;
        scheduler.on_pulse(TickPhase::End, handler)?;

        if let Some(summary) = summary {
            pulses = pulses.saturating_add(1);
            last_tick = summary.tick;
            if summary.failures > 0 {
                warn!(
                    tick = summary.tick,
                    failures = summary.failures,
                    "Pulse finished with failed actions"
                );
            }
            callback.on_pulse(&summary);
        }

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(interval_ms)) => {}
                () = control.stop_notify.notified() => {}
            }
        } else {
            tokio::task::yield_now().await;
        }
    }
}
