//! End-to-end scheduling flows through the public `hudtick-core` API.
//!
//! These drive a scheduler tick by tick with an [`ActionTable`] bound to
//! recording closures, the way a host would.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::{Arc, Mutex};

use hudtick_core::config::{HudConfig, SchedulerConfig};
use hudtick_core::dispatch::ActionTable;
use hudtick_core::scheduler::{ScheduleError, Scheduler};
use hudtick_core::warning::FullInventoryWarning;
use hudtick_types::{CommandKind, TickPhase};
use serde_json::json;

type Log = Arc<Mutex<Vec<(u64, CommandKind)>>>;

/// A table with every kind bound to a closure appending to `log`.
fn recording_table(log: &Log) -> ActionTable {
    let mut table = ActionTable::new();
    for kind in CommandKind::ALL {
        let log = Arc::clone(log);
        table.bind(kind, move |_, inv| {
            log.lock().unwrap().push((inv.tick, inv.kind));
            Ok(())
        });
    }
    table
}

fn pulse_to(scheduler: &mut Scheduler, table: &mut ActionTable, tick: u64) {
    while scheduler.current_tick() < tick {
        scheduler.on_pulse(TickPhase::Start, table);
        scheduler.on_pulse(TickPhase::End, table);
    }
}

#[test]
fn burst_on_one_tick_fires_as_one_entry() {
    let log = Log::default();
    let mut table = recording_table(&log);
    let mut scheduler = Scheduler::new(&SchedulerConfig::default());

    for n in 0..12 {
        scheduler
            .schedule(CommandKind::ResetSubtitle, 2, Some(vec![json!(n)]))
            .unwrap();
    }
    assert_eq!(scheduler.len(), 1);
    let entry = scheduler.entry(40, CommandKind::ResetSubtitle).unwrap();
    assert_eq!(entry.repeat_count(), 12);
    assert_eq!(entry.payload(12), Some(&vec![json!(11)]));

    pulse_to(&mut scheduler, &mut table, 40);
    let fired = log.lock().unwrap().clone();
    assert_eq!(fired.len(), 12);
    assert!(fired.iter().all(|(tick, _)| *tick == 40));
}

#[test]
fn requests_made_at_different_times_coalesce_by_target_tick() {
    let log = Log::default();
    let mut table = recording_table(&log);
    let mut scheduler = Scheduler::new(&SchedulerConfig::default());

    // 3s from tick 0 and 2s from tick 20 both land on tick 60.
    scheduler.schedule(CommandKind::CheckForUpdate, 3, None).unwrap();
    pulse_to(&mut scheduler, &mut table, 20);
    scheduler.schedule(CommandKind::CheckForUpdate, 2, None).unwrap();

    assert_eq!(
        scheduler.entry(60, CommandKind::CheckForUpdate).map(|e| e.repeat_count()),
        Some(2)
    );
    pulse_to(&mut scheduler, &mut table, 60);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[test]
fn rejected_delay_leaves_table_unchanged() {
    let mut scheduler = Scheduler::new(&SchedulerConfig::default());
    scheduler.schedule(CommandKind::ResetTitle, 1, None).unwrap();

    for delay in [0, -5] {
        let err = scheduler.schedule(CommandKind::ResetTitle, delay, None);
        assert_eq!(err, Err(ScheduleError::InvalidDelay { delay_seconds: delay }));
    }
    assert_eq!(scheduler.len(), 1);
    assert_eq!(
        scheduler.entry(20, CommandKind::ResetTitle).map(|e| e.repeat_count()),
        Some(1)
    );
}

#[test]
fn cancelling_a_warning_takes_its_reset_and_nothing_else() {
    let config = HudConfig::parse("scheduler:\n  warning_seconds: 5\n").unwrap();
    let log = Log::default();
    let mut table = recording_table(&log);
    let mut scheduler = Scheduler::new(&config.scheduler);

    // Warning at tick 40, its reset 5s later at tick 140.
    scheduler.schedule(CommandKind::ShowFullInventoryWarning, 2, None).unwrap();
    scheduler.schedule(CommandKind::ResetTitle, 7, None).unwrap();
    scheduler.schedule(CommandKind::EraseUpdateMessage, 2, None).unwrap();
    scheduler.schedule(CommandKind::ResetSubtitle, 7, None).unwrap();

    let report = scheduler.cancel_kind(CommandKind::ShowFullInventoryWarning);
    assert_eq!(report.total(), 2);

    pulse_to(&mut scheduler, &mut table, 200);
    let fired = log.lock().unwrap().clone();
    assert_eq!(
        fired,
        vec![
            (40, CommandKind::EraseUpdateMessage),
            (140, CommandKind::ResetSubtitle)
        ]
    );
}

#[test]
fn repeating_warning_cycle_runs_until_cancelled() {
    let config = HudConfig::parse(
        "scheduler:\n  warning_seconds: 2\n  repeat_full_inventory_warning: true\n  repeat_interval_seconds: 5\n",
    )
    .unwrap();
    let log = Log::default();
    let mut table = recording_table(&log);
    let shown = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&shown);
    table.bind_boxed(
        CommandKind::ShowFullInventoryWarning,
        FullInventoryWarning::new(&config.scheduler, || true, move || {
            *counter.lock().unwrap() += 1;
        })
        .into_action(),
    );

    let mut scheduler = Scheduler::new(&config.scheduler);
    scheduler.schedule(CommandKind::ShowFullInventoryWarning, 1, None).unwrap();

    // Warnings at 20, 120, 220; resets at 160, 260.
    pulse_to(&mut scheduler, &mut table, 230);
    assert_eq!(*shown.lock().unwrap(), 3);

    scheduler.cancel_kind(CommandKind::ShowFullInventoryWarning);
    // The reset for the 220 warning (at 260) fires; the one paired with
    // the cancelled 320 warning (at 360) does not.
    pulse_to(&mut scheduler, &mut table, 400);
    assert_eq!(*shown.lock().unwrap(), 3);
    let resets: Vec<u64> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, kind)| *kind == CommandKind::ResetTitle)
        .map(|(tick, _)| *tick)
        .collect();
    assert_eq!(resets, vec![160, 260]);
    assert!(scheduler.is_empty());
}
