//! Dispatch of fired commands to host-supplied actions.
//!
//! The scheduler treats a [`CommandKind`] as an opaque tag. When an entry
//! fires, each invocation is handed to a [`CommandHandler`], which decides
//! what the kind means. [`ActionTable`] is the stock handler: a table from
//! kind to boxed host closure.
//!
//! Handlers receive the scheduler mutably so an action can queue follow-up
//! work (the repeating warning does exactly that).

use std::collections::BTreeMap;
use std::fmt;

use hudtick_types::{CommandArgs, CommandKind};

use crate::scheduler::{ScheduleError, Scheduler};

/// Errors an action can report back to the scheduler.
///
/// The scheduler logs these; they never abort a pulse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// No action is bound for the fired kind.
    #[error("no action bound for {kind}")]
    Unbound {
        /// The kind that fired.
        kind: CommandKind,
    },

    /// The action ran and failed.
    #[error("{kind} failed: {message}")]
    Failed {
        /// The kind that fired.
        kind: CommandKind,
        /// Description of the failure.
        message: String,
    },

    /// The action tried to schedule follow-up work and was refused.
    #[error("follow-up scheduling failed: {source}")]
    Schedule {
        /// The underlying scheduling error.
        #[from]
        source: ScheduleError,
    },
}

/// One invocation of a fired entry.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Tick on which the entry fired.
    pub tick: u64,
    /// Kind of the fired entry.
    pub kind: CommandKind,
    /// 1-based invocation index within the entry's repeat count.
    pub index: u32,
    /// Arguments recorded for this invocation, if any.
    pub args: Option<&'a CommandArgs>,
}

/// Something that can execute fired commands.
pub trait CommandHandler {
    /// Execute one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the action cannot be carried out. The
    /// scheduler logs it and continues with the next invocation.
    fn execute(
        &mut self,
        scheduler: &mut Scheduler,
        invocation: &Invocation<'_>,
    ) -> Result<(), ActionError>;
}

impl<F> CommandHandler for F
where
    F: FnMut(&mut Scheduler, &Invocation<'_>) -> Result<(), ActionError>,
{
    fn execute(
        &mut self,
        scheduler: &mut Scheduler,
        invocation: &Invocation<'_>,
    ) -> Result<(), ActionError> {
        self(scheduler, invocation)
    }
}

/// A host action bound to one command kind.
pub type Action = Box<dyn FnMut(&mut Scheduler, &Invocation<'_>) -> Result<(), ActionError> + Send>;

/// Dispatch table from command kind to host action.
#[derive(Default)]
pub struct ActionTable {
    actions: BTreeMap<CommandKind, Action>,
}

impl ActionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to `kind`, replacing any previous binding.
    pub fn bind<F>(&mut self, kind: CommandKind, action: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler, &Invocation<'_>) -> Result<(), ActionError> + Send + 'static,
    {
        self.actions.insert(kind, Box::new(action));
        self
    }

    /// Bind an already boxed action.
    pub fn bind_boxed(&mut self, kind: CommandKind, action: Action) -> &mut Self {
        self.actions.insert(kind, action);
        self
    }

    /// Whether `kind` has an action.
    pub fn is_bound(&self, kind: CommandKind) -> bool {
        self.actions.contains_key(&kind)
    }

    /// Kinds with no action bound.
    pub fn unbound_kinds(&self) -> Vec<CommandKind> {
        CommandKind::ALL
            .into_iter()
            .filter(|kind| !self.is_bound(*kind))
            .collect()
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTable")
            .field("bound", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CommandHandler for ActionTable {
    fn execute(
        &mut self,
        scheduler: &mut Scheduler,
        invocation: &Invocation<'_>,
    ) -> Result<(), ActionError> {
        let action = self
            .actions
            .get_mut(&invocation.kind)
            .ok_or(ActionError::Unbound {
                kind: invocation.kind,
            })?;
        action(scheduler, invocation)
    }
}
