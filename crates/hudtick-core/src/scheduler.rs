//! Tick-keyed pending-command table.
//!
//! The [`Scheduler`] owns the tick clock and a map from absolute future
//! tick to the commands due on that tick. Three operations mutate it:
//!
//! - [`Scheduler::schedule`] -- queue a command `delay_seconds` from now.
//!   A second request for the same kind landing on the same tick is
//!   coalesced into the existing entry: its repeat count goes up and the
//!   new arguments are recorded under the next invocation index.
//! - [`Scheduler::cancel_kind`] -- sweep every bucket, removing entries of
//!   one kind together with their dependent follow-up entries.
//! - [`Scheduler::advance`] -- step the clock once and fire everything due.
//!
//! At most one [`CommandEntry`] exists per `(tick, kind)` pair. The due
//! bucket is detached from the table before any action runs, so a failing
//! action cannot leave fired work behind.

use std::collections::BTreeMap;

use hudtick_types::{CommandArgs, CommandKind, TickPhase};
use tracing::{debug, info, trace, warn};

use crate::clock::{self, TickClock};
use crate::config::SchedulerConfig;
use crate::dispatch::{CommandHandler, Invocation};

/// Errors returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The delay was zero or negative; the command could never fire.
    #[error("delay must be greater than zero (got {delay_seconds}s)")]
    InvalidDelay {
        /// The rejected delay.
        delay_seconds: i64,
    },

    /// The target tick does not fit in the tick counter.
    #[error("target tick overflow for a delay of {delay_seconds}s")]
    TickOverflow {
        /// The delay that overflowed.
        delay_seconds: i64,
    },

    /// The coalesced repeat count would exceed `u32::MAX`.
    #[error("repeat count overflow for {kind} at tick {tick}")]
    RepeatOverflow {
        /// Kind of the saturated entry.
        kind: CommandKind,
        /// Tick of the saturated entry.
        tick: u64,
    },
}

/// One pending command on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Which action to invoke.
    kind: CommandKind,
    /// How many times to invoke it (always at least 1).
    repeat_count: u32,
    /// Arguments per invocation index (`1..=repeat_count`). Invocations
    /// scheduled without arguments have no slot here.
    payloads: BTreeMap<u32, CommandArgs>,
}

impl CommandEntry {
    fn new(kind: CommandKind, args: Option<CommandArgs>) -> Self {
        let mut payloads = BTreeMap::new();
        if let Some(args) = args {
            payloads.insert(1, args);
        }
        Self {
            kind,
            repeat_count: 1,
            payloads,
        }
    }

    /// Record one more invocation. Returns its index.
    fn add_invocation(&mut self, args: Option<CommandArgs>) -> Option<u32> {
        self.repeat_count = self.repeat_count.checked_add(1)?;
        if let Some(args) = args {
            self.payloads.insert(self.repeat_count, args);
        }
        Some(self.repeat_count)
    }

    /// The command kind.
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Number of times the action fires on this tick.
    pub const fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Arguments recorded for invocation `index` (1-based), if any.
    pub fn payload(&self, index: u32) -> Option<&CommandArgs> {
        self.payloads.get(&index)
    }
}

/// Table of `(primary -> dependent)` kind pairs.
///
/// Cancelling a primary kind also removes one dependent entry lying the
/// warning window after each removed primary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentPairs {
    pairs: Vec<(CommandKind, CommandKind)>,
}

impl DependentPairs {
    /// A table with no pairs.
    pub const fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Add a pair, returning the extended table.
    #[must_use]
    pub fn with_pair(mut self, primary: CommandKind, dependent: CommandKind) -> Self {
        if !self.pairs.contains(&(primary, dependent)) {
            self.pairs.push((primary, dependent));
        }
        self
    }

    /// Dependent kinds registered for `primary`.
    pub fn dependents_of(&self, primary: CommandKind) -> impl Iterator<Item = CommandKind> + '_ {
        self.pairs
            .iter()
            .filter(move |(p, _)| *p == primary)
            .map(|(_, d)| *d)
    }
}

impl Default for DependentPairs {
    /// A warning and the title reset that clears it.
    fn default() -> Self {
        Self::empty().with_pair(CommandKind::ShowFullInventoryWarning, CommandKind::ResetTitle)
    }
}

/// What a [`Scheduler::cancel_kind`] sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelReport {
    /// Entries of the cancelled kind.
    pub primary_removed: usize,
    /// Dependent follow-up entries removed alongside them.
    pub dependent_removed: usize,
}

impl CancelReport {
    /// Total entries removed.
    pub const fn total(&self) -> usize {
        self.primary_removed.saturating_add(self.dependent_removed)
    }
}

/// Outcome of one [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PulseSummary {
    /// Tick that was reached.
    pub tick: u64,
    /// Entries found on that tick.
    pub entries_fired: usize,
    /// Action invocations made (sum of repeat counts).
    pub invocations: u64,
    /// Invocations whose action returned an error.
    pub failures: u64,
}

impl PulseSummary {
    const fn idle(tick: u64) -> Self {
        Self {
            tick,
            entries_fired: 0,
            invocations: 0,
            failures: 0,
        }
    }
}

/// Coalescing delayed-command scheduler.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Tick counter.
    clock: TickClock,
    /// Target tick -> entries due on it. Never holds an empty bucket
    /// after an operation returns.
    pending: BTreeMap<u64, Vec<CommandEntry>>,
    /// Offset in seconds between a primary entry and its dependent.
    warning_seconds: u64,
    /// Kinds removed together during cancellation.
    dependents: DependentPairs,
}

impl Scheduler {
    /// Create a scheduler at tick 0 with the default dependent pairs.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self::with_dependents(config.warning_seconds, DependentPairs::default())
    }

    /// Create a scheduler at tick 0 with an explicit dependent table.
    pub fn with_dependents(warning_seconds: u64, dependents: DependentPairs) -> Self {
        Self {
            clock: TickClock::new(),
            pending: BTreeMap::new(),
            warning_seconds,
            dependents,
        }
    }

    /// Current tick.
    pub const fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Warning window used for dependent-tick offsets, in seconds.
    pub const fn warning_seconds(&self) -> u64 {
        self.warning_seconds
    }

    /// Change the warning window (e.g. after a config reload).
    pub const fn set_warning_seconds(&mut self, seconds: u64) {
        self.warning_seconds = seconds;
    }

    /// Queue `kind` to fire `delay_seconds` from now. Returns the target tick.
    ///
    /// Empty argument lists are treated like no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDelay`] for a delay of zero or less,
    /// [`ScheduleError::TickOverflow`] if the target tick overflows, and
    /// [`ScheduleError::RepeatOverflow`] if the coalesced entry is full.
    /// The table is unchanged on error.
    pub fn schedule(
        &mut self,
        kind: CommandKind,
        delay_seconds: i64,
        args: Option<CommandArgs>,
    ) -> Result<u64, ScheduleError> {
        let delay = u64::try_from(delay_seconds)
            .ok()
            .filter(|d| *d > 0)
            .ok_or(ScheduleError::InvalidDelay { delay_seconds })?;
        let target = clock::ticks_for_seconds(delay)
            .and_then(|ticks| self.clock.offset(ticks))
            .ok_or(ScheduleError::TickOverflow { delay_seconds })?;
        let args = args.filter(|a| !a.is_empty());

        let bucket = self.pending.entry(target).or_default();
        if let Some(entry) = bucket.iter_mut().find(|e| e.kind == kind) {
            let index = entry
                .add_invocation(args)
                .ok_or(ScheduleError::RepeatOverflow { kind, tick: target })?;
            debug!(tick = target, %kind, repeat_count = index, "Coalesced scheduled command");
        } else {
            bucket.push(CommandEntry::new(kind, args));
            debug!(tick = target, %kind, now = self.clock.tick(), "Scheduled command");
        }
        Ok(target)
    }

    /// Remove every pending entry of `kind`, plus the dependent entry
    /// paired with each one.
    ///
    /// For a removed entry at tick `T`, each dependent kind of `kind` is
    /// removed from tick `T + warning_seconds * 20` if present. Entries of
    /// other kinds, at the same or other ticks, are untouched.
    pub fn cancel_kind(&mut self, kind: CommandKind) -> CancelReport {
        let offset = clock::ticks_for_seconds(self.warning_seconds);
        let mut report = CancelReport::default();
        let mut dependent_ticks = Vec::new();

        for (&tick, bucket) in &mut self.pending {
            let before = bucket.len();
            bucket.retain(|e| e.kind != kind);
            let removed = before.saturating_sub(bucket.len());
            if removed == 0 {
                continue;
            }
            report.primary_removed = report.primary_removed.saturating_add(removed);
            if let Some(dep_tick) = offset.and_then(|o| tick.checked_add(o)) {
                dependent_ticks.push(dep_tick);
            }
        }

        for dep_tick in dependent_ticks {
            for dependent in self.dependents.dependents_of(kind) {
                let Some(bucket) = self.pending.get_mut(&dep_tick) else {
                    break;
                };
                if let Some(pos) = bucket.iter().position(|e| e.kind == dependent) {
                    bucket.remove(pos);
                    report.dependent_removed = report.dependent_removed.saturating_add(1);
                }
            }
        }

        self.pending.retain(|_, bucket| !bucket.is_empty());

        if report.total() > 0 {
            info!(
                %kind,
                primary_removed = report.primary_removed,
                dependent_removed = report.dependent_removed,
                "Cancelled pending commands"
            );
        }
        report
    }

    /// Handle one host pulse. Only [`TickPhase::Start`] advances.
    pub fn on_pulse(
        &mut self,
        phase: TickPhase,
        handler: &mut dyn CommandHandler,
    ) -> Option<PulseSummary> {
        match phase {
            TickPhase::Start => Some(self.advance(handler)),
            TickPhase::End => None,
        }
    }

    /// Advance one tick and fire every entry due on the new tick.
    ///
    /// Each entry's action runs `repeat_count` times in a row. Actions may
    /// schedule further commands; those land on a strictly later tick.
    /// Action errors are logged and counted, never propagated.
    pub fn advance(&mut self, handler: &mut dyn CommandHandler) -> PulseSummary {
        let tick = match self.clock.advance() {
            Ok(tick) => tick,
            Err(e) => {
                warn!(error = %e, "Tick counter saturated, pulse ignored");
                return PulseSummary::idle(self.clock.tick());
            }
        };

        let Some(due) = self.pending.remove(&tick) else {
            return PulseSummary::idle(tick);
        };

        let mut summary = PulseSummary::idle(tick);
        summary.entries_fired = due.len();

        for entry in &due {
            trace!(tick, kind = %entry.kind, repeat_count = entry.repeat_count, "Firing command");
            for index in 1..=entry.repeat_count {
                let invocation = Invocation {
                    tick,
                    kind: entry.kind,
                    index,
                    args: entry.payload(index),
                };
                summary.invocations = summary.invocations.saturating_add(1);
                if let Err(e) = handler.execute(self, &invocation) {
                    summary.failures = summary.failures.saturating_add(1);
                    warn!(tick, kind = %entry.kind, index, error = %e, "Scheduled action failed");
                }
            }
        }

        summary
    }

    /// The entry for `kind` due on `tick`, if any.
    pub fn entry(&self, tick: u64, kind: CommandKind) -> Option<&CommandEntry> {
        self.bucket(tick).iter().find(|e| e.kind == kind)
    }

    /// All entries due on `tick`, in insertion order.
    pub fn bucket(&self, tick: u64) -> &[CommandEntry] {
        self.pending.get(&tick).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ticks that have pending work, ascending.
    pub fn pending_ticks(&self) -> impl Iterator<Item = u64> + '_ {
        self.pending.keys().copied()
    }

    /// Total number of pending entries across all ticks.
    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::ActionError;

    /// Records every invocation it receives.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(u64, CommandKind, u32, Option<CommandArgs>)>,
    }

    impl CommandHandler for Recorder {
        fn execute(
            &mut self,
            _scheduler: &mut Scheduler,
            invocation: &Invocation<'_>,
        ) -> Result<(), ActionError> {
            self.calls.push((
                invocation.tick,
                invocation.kind,
                invocation.index,
                invocation.args.cloned(),
            ));
            Ok(())
        }
    }

    /// Fires once per second by rescheduling its own kind.
    #[derive(Default)]
    struct Rescheduler {
        fired: Vec<u64>,
    }

    impl CommandHandler for Rescheduler {
        fn execute(
            &mut self,
            scheduler: &mut Scheduler,
            invocation: &Invocation<'_>,
        ) -> Result<(), ActionError> {
            self.fired.push(invocation.tick);
            scheduler.schedule(invocation.kind, 1, None)?;
            Ok(())
        }
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(&SchedulerConfig::default())
    }

    fn run_until(scheduler: &mut Scheduler, handler: &mut dyn CommandHandler, tick: u64) {
        while scheduler.current_tick() < tick {
            scheduler.advance(handler);
        }
    }

    #[test]
    fn same_kind_same_tick_coalesces() {
        let mut s = scheduler();
        let t1 = s.schedule(CommandKind::ResetTitle, 2, None).unwrap();
        let t2 = s.schedule(CommandKind::ResetTitle, 2, None).unwrap();
        assert_eq!(t1, 40);
        assert_eq!(t1, t2);
        assert_eq!(s.len(), 1);
        assert_eq!(s.entry(40, CommandKind::ResetTitle).unwrap().repeat_count(), 2);

        let mut rec = Recorder::default();
        run_until(&mut s, &mut rec, 40);
        assert_eq!(rec.calls.len(), 2);
        assert!(rec.calls.iter().all(|c| c.0 == 40));
        assert!(s.is_empty());
    }

    #[test]
    fn different_kinds_same_tick_stay_separate() {
        let mut s = scheduler();
        s.schedule(CommandKind::ResetTitle, 1, None).unwrap();
        s.schedule(CommandKind::ResetSubtitle, 1, None).unwrap();
        assert_eq!(s.bucket(20).len(), 2);

        let mut rec = Recorder::default();
        run_until(&mut s, &mut rec, 20);
        let kinds: Vec<_> = rec.calls.iter().map(|c| c.1).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&CommandKind::ResetTitle));
        assert!(kinds.contains(&CommandKind::ResetSubtitle));
    }

    #[test]
    fn non_positive_delay_is_rejected() {
        let mut s = scheduler();
        assert_eq!(
            s.schedule(CommandKind::CheckForUpdate, 0, None),
            Err(ScheduleError::InvalidDelay { delay_seconds: 0 })
        );
        assert_eq!(
            s.schedule(CommandKind::CheckForUpdate, -5, None),
            Err(ScheduleError::InvalidDelay { delay_seconds: -5 })
        );
        assert!(s.is_empty());
    }

    #[test]
    fn huge_delay_overflows_cleanly() {
        let mut s = scheduler();
        let result = s.schedule(CommandKind::CheckForUpdate, i64::MAX, None);
        assert!(matches!(result, Err(ScheduleError::TickOverflow { .. })));
        assert!(s.is_empty());
    }

    #[test]
    fn payloads_are_kept_per_invocation_index() {
        let mut s = scheduler();
        s.schedule(CommandKind::EraseUpdateMessage, 1, Some(vec![json!("first")]))
            .unwrap();
        s.schedule(CommandKind::EraseUpdateMessage, 1, None).unwrap();
        s.schedule(CommandKind::EraseUpdateMessage, 1, Some(vec![json!(3)]))
            .unwrap();
        s.schedule(CommandKind::EraseUpdateMessage, 1, Some(Vec::new()))
            .unwrap();

        let entry = s.entry(20, CommandKind::EraseUpdateMessage).unwrap();
        assert_eq!(entry.repeat_count(), 4);
        assert_eq!(entry.payload(1), Some(&vec![json!("first")]));
        assert_eq!(entry.payload(2), None);
        assert_eq!(entry.payload(3), Some(&vec![json!(3)]));
        assert_eq!(entry.payload(4), None);

        let mut rec = Recorder::default();
        run_until(&mut s, &mut rec, 20);
        let indices: Vec<_> = rec.calls.iter().map(|c| c.2).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(rec.calls.get(2).and_then(|c| c.3.clone()), Some(vec![json!(3)]));
    }

    #[test]
    fn cancel_removes_warning_and_its_reset_only() {
        let mut s = scheduler();
        // Warning at tick 20, its reset at 20 + 4s * 20 = 100.
        s.schedule(CommandKind::ShowFullInventoryWarning, 1, None).unwrap();
        s.schedule(CommandKind::ResetTitle, 5, None).unwrap();
        // Unrelated work on the warning's tick and on another tick.
        s.schedule(CommandKind::CheckForUpdate, 1, None).unwrap();
        s.schedule(CommandKind::ResetTitle, 2, None).unwrap();

        let report = s.cancel_kind(CommandKind::ShowFullInventoryWarning);
        assert_eq!(
            report,
            CancelReport {
                primary_removed: 1,
                dependent_removed: 1
            }
        );
        assert!(s.entry(20, CommandKind::CheckForUpdate).is_some());
        assert!(s.entry(40, CommandKind::ResetTitle).is_some());
        assert!(s.entry(100, CommandKind::ResetTitle).is_none());
        assert_eq!(s.pending_ticks().collect::<Vec<_>>(), vec![20, 40]);
    }

    #[test]
    fn cancel_without_dependent_pair_removes_only_that_kind() {
        let mut s = scheduler();
        s.schedule(CommandKind::CheckForUpdate, 1, None).unwrap();
        s.schedule(CommandKind::ResetTitle, 5, None).unwrap();

        let report = s.cancel_kind(CommandKind::CheckForUpdate);
        assert_eq!(report.primary_removed, 1);
        assert_eq!(report.dependent_removed, 0);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn cancel_of_absent_kind_is_silent() {
        let mut s = scheduler();
        s.schedule(CommandKind::ResetTitle, 1, None).unwrap();
        let report = s.cancel_kind(CommandKind::ShowFullInventoryWarning);
        assert_eq!(report.total(), 0);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn custom_dependent_table_is_honored() {
        let pairs = DependentPairs::empty()
            .with_pair(CommandKind::CheckForUpdate, CommandKind::EraseUpdateMessage);
        let mut s = Scheduler::with_dependents(1, pairs);
        s.schedule(CommandKind::CheckForUpdate, 2, None).unwrap();
        s.schedule(CommandKind::EraseUpdateMessage, 3, None).unwrap();
        s.schedule(CommandKind::ShowFullInventoryWarning, 2, None).unwrap();
        s.schedule(CommandKind::ResetTitle, 3, None).unwrap();

        let report = s.cancel_kind(CommandKind::CheckForUpdate);
        assert_eq!(report.total(), 2);

        // The default pair is not registered here.
        let report = s.cancel_kind(CommandKind::ShowFullInventoryWarning);
        assert_eq!(report.dependent_removed, 0);
        assert!(s.entry(60, CommandKind::ResetTitle).is_some());
    }

    #[test]
    fn empty_ticks_are_noops_and_other_ticks_are_untouched() {
        let mut s = scheduler();
        s.schedule(CommandKind::ResetTitle, 1, None).unwrap();
        s.schedule(CommandKind::ResetSubtitle, 2, None).unwrap();

        let mut rec = Recorder::default();
        let summary = s.advance(&mut rec);
        assert_eq!(summary, PulseSummary::idle(1));

        run_until(&mut s, &mut rec, 20);
        assert_eq!(rec.calls.len(), 1);
        assert!(s.entry(40, CommandKind::ResetSubtitle).is_some());
        assert_eq!(s.pending_ticks().collect::<Vec<_>>(), vec![40]);
    }

    #[test]
    fn end_phase_does_not_advance() {
        let mut s = scheduler();
        let mut rec = Recorder::default();
        assert!(s.on_pulse(TickPhase::End, &mut rec).is_none());
        assert_eq!(s.current_tick(), 0);
        assert!(s.on_pulse(TickPhase::Start, &mut rec).is_some());
        assert_eq!(s.current_tick(), 1);
    }

    #[test]
    fn failing_action_still_clears_its_tick() {
        fn fail(_: &mut Scheduler, inv: &Invocation<'_>) -> Result<(), ActionError> {
            Err(ActionError::Failed {
                kind: inv.kind,
                message: "boom".to_owned(),
            })
        }

        let mut s = scheduler();
        s.schedule(CommandKind::CheckForUpdate, 1, None).unwrap();
        s.schedule(CommandKind::CheckForUpdate, 1, None).unwrap();

        let mut failing = fail;
        let mut summary = PulseSummary::default();
        while s.current_tick() < 20 {
            summary = s.advance(&mut failing);
        }
        assert_eq!(summary.invocations, 2);
        assert_eq!(summary.failures, 2);
        assert!(s.is_empty());
    }

    #[test]
    fn action_can_reschedule_itself() {
        let mut s = scheduler();
        s.schedule(CommandKind::CheckForUpdate, 1, None).unwrap();

        let mut again = Rescheduler::default();
        for _ in 0..60 {
            s.advance(&mut again);
        }
        assert_eq!(again.fired, vec![20, 40, 60]);
        assert_eq!(s.pending_ticks().collect::<Vec<_>>(), vec![80]);
    }
}
