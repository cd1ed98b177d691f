//! Mutex-guarded scheduler handle for hosts with more than one thread.
//!
//! Every operation takes the lock for its whole duration, so schedule,
//! cancel, and advance never interleave. Actions run while the lock is
//! held and receive the scheduler directly, so they reschedule without
//! re-locking.

use std::sync::{Arc, Mutex, MutexGuard};

use hudtick_types::{CommandArgs, CommandKind, TickPhase};

use crate::dispatch::CommandHandler;
use crate::scheduler::{CancelReport, PulseSummary, ScheduleError, Scheduler};

/// Errors from [`SharedScheduler`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SharedError {
    /// A previous holder of the lock panicked.
    #[error("scheduler lock poisoned")]
    Poisoned,

    /// The scheduler rejected the request.
    #[error("schedule error: {source}")]
    Schedule {
        /// The underlying scheduling error.
        #[from]
        source: ScheduleError,
    },
}

/// Cloneable handle to one scheduler.
#[derive(Debug, Clone)]
pub struct SharedScheduler {
    inner: Arc<Mutex<Scheduler>>,
}

impl SharedScheduler {
    /// Wrap a scheduler.
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Scheduler>, SharedError> {
        self.inner.lock().map_err(|_poisoned| SharedError::Poisoned)
    }

    /// See [`Scheduler::schedule`].
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::Schedule`] if the request is rejected, or
    /// [`SharedError::Poisoned`] if the lock is poisoned.
    pub fn schedule(
        &self,
        kind: CommandKind,
        delay_seconds: i64,
        args: Option<CommandArgs>,
    ) -> Result<u64, SharedError> {
        Ok(self.lock()?.schedule(kind, delay_seconds, args)?)
    }

    /// See [`Scheduler::cancel_kind`].
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::Poisoned`] if the lock is poisoned.
    pub fn cancel_kind(&self, kind: CommandKind) -> Result<CancelReport, SharedError> {
        Ok(self.lock()?.cancel_kind(kind))
    }

    /// See [`Scheduler::advance`].
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::Poisoned`] if the lock is poisoned.
    pub fn advance(&self, handler: &mut dyn CommandHandler) -> Result<PulseSummary, SharedError> {
        Ok(self.lock()?.advance(handler))
    }

    /// See [`Scheduler::on_pulse`].
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::Poisoned`] if the lock is poisoned.
    pub fn on_pulse(
        &self,
        phase: TickPhase,
        handler: &mut dyn CommandHandler,
    ) -> Result<Option<PulseSummary>, SharedError> {
        Ok(self.lock()?.on_pulse(phase, handler))
    }

    /// Run `f` with exclusive access, e.g. to inspect pending work.
    ///
    /// # Errors
    ///
    /// Returns [`SharedError::Poisoned`] if the lock is poisoned.
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler) -> R) -> Result<R, SharedError> {
        Ok(f(&mut *self.lock()?))
    }
}
