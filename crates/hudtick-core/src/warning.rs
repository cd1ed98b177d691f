//! The full-inventory warning action.
//!
//! Showing the warning is a host concern; this module owns the policy
//! around it. The warning is skipped when the host reports it is not in a
//! state where warnings make sense. When repeating is enabled, each shown
//! warning queues the next warning and the title reset that clears it.

use hudtick_types::CommandKind;

use crate::config::SchedulerConfig;
use crate::dispatch::{Action, ActionError, Invocation};
use crate::scheduler::Scheduler;

/// Repeating full-inventory warning.
#[derive(Debug, Clone)]
pub struct FullInventoryWarning<P, S> {
    /// Whether the host is in a state where the warning applies.
    is_active: P,
    /// Puts the warning on screen.
    show: S,
    /// Reschedule after showing.
    repeat: bool,
    /// Seconds until the next warning.
    repeat_interval_seconds: i64,
    /// Seconds the warning title stays up.
    warning_seconds: u64,
}

impl<P, S> FullInventoryWarning<P, S>
where
    P: FnMut() -> bool,
    S: FnMut(),
{
    /// Build the action from scheduler config and the two host callbacks.
    pub const fn new(config: &SchedulerConfig, is_active: P, show: S) -> Self {
        Self {
            is_active,
            show,
            repeat: config.repeat_full_inventory_warning,
            repeat_interval_seconds: config.repeat_interval_seconds,
            warning_seconds: config.warning_seconds,
        }
    }

    /// Show the warning and, if repeating, queue the next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Schedule`] if the follow-up commands cannot be
    /// queued, or [`ActionError::Failed`] if their delays overflow.
    pub fn run(&mut self, scheduler: &mut Scheduler) -> Result<(), ActionError> {
        if !(self.is_active)() {
            return Ok(());
        }

        (self.show)();

        if self.repeat {
            let reset_delay = i64::try_from(self.warning_seconds)
                .ok()
                .and_then(|w| self.repeat_interval_seconds.checked_add(w))
                .ok_or_else(|| ActionError::Failed {
                    kind: CommandKind::ShowFullInventoryWarning,
                    message: "reset delay overflow".to_owned(),
                })?;
            scheduler.schedule(
                CommandKind::ShowFullInventoryWarning,
                self.repeat_interval_seconds,
                None,
            )?;
            scheduler.schedule(CommandKind::ResetTitle, reset_delay, None)?;
        }
        Ok(())
    }
}

impl<P, S> FullInventoryWarning<P, S>
where
    P: FnMut() -> bool + Send + 'static,
    S: FnMut() + Send + 'static,
{
    /// Box the warning for an [`ActionTable`](crate::dispatch::ActionTable).
    pub fn into_action(mut self) -> Action {
        Box::new(move |scheduler: &mut Scheduler, _: &Invocation<'_>| self.run(scheduler))
    }
}
