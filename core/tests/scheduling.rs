//! Scheduled refresh: polling, pause and overrun handling.

use chrono::{DateTime, TimeZone, Utc};
use octroi_core::{engine::DashboardEngine, event::SimEvent};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_735_000_000 + secs, 0).unwrap()
}

#[test]
fn poll_ticks_once_per_interval() {
    let mut engine = DashboardEngine::build_test("sched-basic".into(), 1).unwrap();
    assert_eq!(engine.config().refresh_interval_secs, 30);

    assert!(engine.poll(at(0)).unwrap().is_none());
    assert!(engine.poll(at(10)).unwrap().is_none());

    let events = engine.poll(at(30)).unwrap().expect("refresh due");
    assert!(matches!(events.first(), Some(SimEvent::TickStarted { tick: 1 })));
    assert!(matches!(events.last(), Some(SimEvent::TickCompleted { tick: 1 })));
    assert_eq!(engine.clock.current_tick, 1);

    assert!(engine.poll(at(45)).unwrap().is_none());
    assert!(engine.poll(at(60)).unwrap().is_some());
    assert_eq!(engine.clock.current_tick, 2);
}

/// A late poll runs one tick and journals the dropped periods.
#[test]
fn overrun_runs_single_tick() {
    let mut engine = DashboardEngine::build_test("sched-overrun".into(), 2).unwrap();
    engine.poll(at(0)).unwrap();

    assert!(engine.poll(at(125)).unwrap().is_some());
    assert_eq!(engine.clock.current_tick, 1);
    assert_eq!(engine.clock.skipped_total(), 3);
    assert_eq!(engine.store_event_count("refresh_skipped").unwrap(), 1);

    assert!(engine.poll(at(150)).unwrap().is_none());
    assert!(engine.poll(at(155)).unwrap().is_some());
    assert_eq!(engine.clock.current_tick, 2);
    assert_eq!(engine.store_event_count("refresh_skipped").unwrap(), 1);
}

#[test]
fn paused_engine_ignores_schedule() {
    let mut engine = DashboardEngine::build_test("sched-pause".into(), 3).unwrap();
    engine.poll(at(0)).unwrap();
    engine.clock.pause();

    assert!(engine.poll(at(30)).unwrap().is_none());
    assert!(engine.poll(at(600)).unwrap().is_none());
    assert_eq!(engine.clock.current_tick, 0);

    engine.clock.resume();
    assert!(engine.poll(at(601)).unwrap().is_none());
    assert!(engine.poll(at(631)).unwrap().is_some());
    assert_eq!(engine.clock.current_tick, 1);
}

/// A long pause followed by resume is not reported as an overrun.
#[test]
fn resume_after_pause_records_no_skips() {
    let mut engine = DashboardEngine::build_test("sched-resume".into(), 6).unwrap();
    engine.poll(at(0)).unwrap();
    engine.clock.pause();
    engine.poll(at(600)).unwrap();
    engine.clock.resume();

    engine.poll(at(601)).unwrap();
    engine.poll(at(631)).unwrap();
    engine.poll(at(661)).unwrap();

    assert_eq!(engine.clock.current_tick, 2);
    assert_eq!(engine.clock.skipped_total(), 0);
    assert_eq!(engine.store_event_count("refresh_skipped").unwrap(), 0);
}

#[test]
fn manual_refresh_allowed_while_paused() {
    let mut engine = DashboardEngine::build_test("sched-manual".into(), 4).unwrap();
    engine.clock.pause();
    let before = engine.snapshot().rows().to_vec();

    let mut changed = false;
    for _ in 0..10 {
        engine.tick().unwrap();
        changed |= engine.snapshot().rows() != before.as_slice();
    }
    assert_eq!(engine.clock.current_tick, 10);
    assert!(changed, "ten manual ticks never changed a row");
}
