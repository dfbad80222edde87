//! End-to-end session tests driving the engine through its public API
//! with a manual clock, the way a host would: many small ticks against
//! wall-clock time.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cornerman_core::timer::{Clock, SettingsPatch, TimerEngine, TimerSettings};
use cornerman_core::{CueSink, Phase};

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Clone, Default)]
struct CueLog(Rc<RefCell<Vec<&'static str>>>);

impl CueLog {
    fn count(&self, cue: &str) -> usize {
        self.0.borrow().iter().filter(|c| **c == cue).count()
    }
}

impl CueSink for CueLog {
    fn play_ready(&self) {
        self.0.borrow_mut().push("ready");
    }
    fn play_soon(&self) {
        self.0.borrow_mut().push("soon");
    }
    fn play_start(&self) {
        self.0.borrow_mut().push("start");
    }
    fn play_finish(&self) {
        self.0.borrow_mut().push("finish");
    }
}

const TICK_MS: u64 = 100;

fn engine(round: u64, rest: u64, rounds: u32) -> (TimerEngine, ManualClock, CueLog) {
    let clock = ManualClock::default();
    clock.advance(1_700_000_000_000); // a plausible wall clock
    let cues = CueLog::default();
    let engine = TimerEngine::with_clock(
        TimerSettings::clamped(round, rest, rounds),
        Box::new(cues.clone()),
        Box::new(clock.clone()),
    );
    (engine, clock, cues)
}

/// Advance wall-clock time in tick-sized steps, ticking the engine at
/// each one, the way the CLI run loop does.
fn run_for(engine: &mut TimerEngine, clock: &ManualClock, ms: u64) {
    let mut left = ms;
    while left > 0 {
        let step = left.min(TICK_MS);
        clock.advance(step);
        engine.tick();
        left -= step;
    }
}

#[test]
fn three_round_session_walks_every_phase() {
    let (mut engine, clock, cues) = engine(60_000, 10_000, 3);
    engine.start();
    assert_eq!(engine.snapshot().phase, Phase::Ready);

    run_for(&mut engine, &clock, 3_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Work);
    assert_eq!(engine.snapshot().current_round, 1);

    run_for(&mut engine, &clock, 60_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Rest);
    assert_eq!(engine.snapshot().current_round, 1);

    run_for(&mut engine, &clock, 10_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Work);
    assert_eq!(engine.snapshot().current_round, 2);

    run_for(&mut engine, &clock, 60_000 + TICK_MS);
    run_for(&mut engine, &clock, 10_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Work);
    assert_eq!(engine.snapshot().current_round, 3);

    run_for(&mut engine, &clock, 60_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Idle);
    assert_eq!(engine.snapshot().current_round, 0);
    assert!(!engine.is_running());

    // One finish bell per completed round, no extra one for the reset.
    assert_eq!(cues.count("finish"), 3);
    // Ready exit plus two rest exits ring the start bell.
    assert_eq!(cues.count("start"), 3);
    // One soon warning per work round.
    assert_eq!(cues.count("soon"), 3);
    // Initial start plus the tail of each of the two rests.
    assert_eq!(cues.count("ready"), 3);
}

#[test]
fn soon_cue_rings_once_at_the_ten_second_mark() {
    let (mut engine, clock, cues) = engine(60_000, 10_000, 1);
    engine.start();
    run_for(&mut engine, &clock, 3_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Work);

    run_for(&mut engine, &clock, 49_800);
    assert_eq!(cues.count("soon"), 0);
    run_for(&mut engine, &clock, 2 * TICK_MS);
    assert_eq!(cues.count("soon"), 1);
    run_for(&mut engine, &clock, 5_000);
    assert_eq!(cues.count("soon"), 1);
}

#[test]
fn pause_resume_holds_remaining_within_a_tick() {
    let (mut engine, clock, _cues) = engine(60_000, 10_000, 3);
    engine.start();
    run_for(&mut engine, &clock, 3_000 + TICK_MS);

    run_for(&mut engine, &clock, 21_700);
    let at_pause = engine.snapshot().time_left_ms;
    engine.pause();

    // A long lunch between pause and resume.
    clock.advance(2 * 60 * 60 * 1000);
    engine.start();
    clock.advance(TICK_MS);
    engine.tick();
    let after_resume = engine.snapshot().time_left_ms;

    assert!(at_pause - after_resume <= TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Work);
}

#[test]
fn unbounded_session_has_no_finish_time_and_never_completes() {
    let (mut engine, clock, _cues) = engine(60_000, 10_000, 0);
    assert!(engine.state().finish_time.is_none());

    engine.start();
    run_for(&mut engine, &clock, 3_000 + TICK_MS);
    for _ in 0..4 {
        assert!(engine.state().finish_time.is_none());
        run_for(&mut engine, &clock, 60_000 + TICK_MS);
        assert_eq!(engine.snapshot().phase, Phase::Rest);
        run_for(&mut engine, &clock, 10_000 + TICK_MS);
        assert_eq!(engine.snapshot().phase, Phase::Work);
    }
    assert!(engine.is_running());
}

#[test]
fn dropping_the_cap_mid_work_keeps_the_session_going() {
    let (mut engine, clock, _cues) = engine(60_000, 10_000, 3);
    engine.start();
    run_for(&mut engine, &clock, 3_000 + TICK_MS);
    run_for(&mut engine, &clock, 60_000 + TICK_MS);
    run_for(&mut engine, &clock, 10_000 + TICK_MS);
    run_for(&mut engine, &clock, 60_000 + TICK_MS);
    run_for(&mut engine, &clock, 10_000 + TICK_MS);
    assert_eq!(engine.snapshot().current_round, 3);
    assert!(engine.state().finish_time.is_some());

    engine.update_settings(SettingsPatch {
        total_rounds: Some(0),
        ..Default::default()
    });
    assert!(engine.state().finish_time.is_none());

    // What would have been the final round now rolls into rest.
    run_for(&mut engine, &clock, 60_000 + TICK_MS);
    assert_eq!(engine.snapshot().phase, Phase::Rest);
    assert!(engine.is_running());
}

#[test]
fn rapid_toggles_collapse_to_one_state_change() {
    let (mut engine, clock, _cues) = engine(60_000, 10_000, 3);
    for _ in 0..4 {
        engine.toggle();
        clock.advance(15);
    }
    assert!(engine.is_running());
    assert_eq!(engine.snapshot().phase, Phase::Ready);
}

#[test]
fn observers_see_derived_state_for_every_change() {
    let (mut engine, clock, _cues) = engine(60_000, 10_000, 2);
    let statuses: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = statuses.clone();
    engine.subscribe(Box::new(move |view| {
        sink.borrow_mut().push(format!("{} {}", view.status, view.display));
    }));

    engine.start();
    assert_eq!(statuses.borrow().last().unwrap(), "Get Ready 00:03");

    run_for(&mut engine, &clock, 3_000);
    assert_eq!(statuses.borrow().last().unwrap(), "Round 1 01:00");

    engine.pause();
    assert!(statuses.borrow().last().unwrap().starts_with("Paused - Round 1"));
}

#[test]
fn snapshot_roundtrip_resumes_the_same_session() {
    let (mut engine, clock, cues) = engine(60_000, 10_000, 3);
    engine.start();
    run_for(&mut engine, &clock, 3_000 + TICK_MS);
    run_for(&mut engine, &clock, 12_300);
    engine.pause();

    // What the CLI does between invocations: snapshot out, snapshot in.
    let json = serde_json::to_string(engine.snapshot()).unwrap();
    let restored: cornerman_core::TimerSnapshot = serde_json::from_str(&json).unwrap();
    let mut engine2 = TimerEngine::from_snapshot(restored, Box::new(cues.clone()));

    assert_eq!(engine2.snapshot(), engine.snapshot());
    engine2.start();
    assert!(engine2.is_running());
    assert_eq!(engine2.snapshot().current_round, 1);
}
