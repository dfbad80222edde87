//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not spawn
//! threads -- the host drives it by calling `tick()` on a fixed cadence
//! while the timer is running (the CLI run loop does this with a tokio
//! interval). Remaining time is recomputed from absolute timestamps on
//! every tick, so missed ticks are caught up rather than lost.
//!
//! ## State transitions
//!
//! ```text
//! Idle --start--> Ready --> Work --> Rest --> Work (round+1) ...
//! Work --rounds exhausted--> Idle (session complete)
//! any running phase --pause--> frozen --start--> same phase resumes
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::clock::{Clock, SystemClock};
use super::phase::{
    self, Phase, TimerSettings, TimerSnapshot, READY_TIME_MS, SOON_TIME_MS,
};
use super::view::TimerView;
use crate::audio::CueSink;

/// Toggle calls closer together than this are duplicate input events.
const TOGGLE_DEBOUNCE_MS: u64 = 100;

/// Optional per-field settings update. Absent fields keep their value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPatch {
    pub round_time_ms: Option<u64>,
    pub rest_time_ms: Option<u64>,
    pub total_rounds: Option<u32>,
}

/// Handle returned by [`TimerEngine::subscribe`]; pass it back to
/// [`TimerEngine::unsubscribe`] to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&TimerView)>;

/// Stateful driver of the round timer.
///
/// Owns the snapshot, consults the phase machine for transitions, fires
/// audio cues through the injected [`CueSink`], and notifies subscribers
/// with the derived view after every mutation.
pub struct TimerEngine {
    snapshot: TimerSnapshot,
    sink: Box<dyn CueSink>,
    clock: Box<dyn Clock>,
    subscribers: BTreeMap<u64, Subscriber>,
    next_subscriber_id: u64,
    /// Epoch ms of the last accepted toggle.
    last_toggle_ms: Option<u64>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("snapshot", &self.snapshot)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TimerEngine {
    /// Create an engine in the idle state.
    pub fn new(settings: TimerSettings, sink: Box<dyn CueSink>) -> Self {
        Self::with_clock(settings, sink, Box::new(SystemClock))
    }

    /// Create an engine with an explicit clock. Tests inject a manual one.
    pub fn with_clock(
        settings: TimerSettings,
        sink: Box<dyn CueSink>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            snapshot: TimerSnapshot::initial(settings),
            sink,
            clock,
            subscribers: BTreeMap::new(),
            next_subscriber_id: 0,
            last_toggle_ms: None,
        }
    }

    /// Rebuild an engine around a previously captured snapshot.
    ///
    /// Settings floors are re-applied in case the snapshot was edited at
    /// rest.
    pub fn from_snapshot(snapshot: TimerSnapshot, sink: Box<dyn CueSink>) -> Self {
        let mut snapshot = snapshot;
        let settings = TimerSettings::clamped(
            snapshot.round_time_ms,
            snapshot.rest_time_ms,
            snapshot.total_rounds,
        );
        snapshot.round_time_ms = settings.round_time_ms;
        snapshot.rest_time_ms = settings.rest_time_ms;
        let mut engine = Self::with_clock(settings, sink, Box::new(SystemClock));
        engine.snapshot = snapshot;
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> &TimerSnapshot {
        &self.snapshot
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.is_running
    }

    pub fn settings(&self) -> TimerSettings {
        self.snapshot.settings()
    }

    /// Snapshot plus derived values (formatted time, status, finish time).
    pub fn state(&self) -> TimerView {
        TimerView::derive(&self.snapshot, self.wall_now())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh session, or resume the current phase after a pause.
    ///
    /// Idempotent: calling while already running changes nothing.
    pub fn start(&mut self) {
        if self.snapshot.is_running {
            return;
        }
        let now = self.clock.now_ms();

        if self.snapshot.phase == Phase::Idle && self.snapshot.current_round == 0 {
            self.snapshot = phase::transition(&self.snapshot, Phase::Ready, now);
            self.sink.play_ready();
        } else {
            // Resuming: rebuild the phase start so time served before the
            // pause stays served. A settings change may have shrunk the
            // phase below its frozen remainder; saturate to a full phase.
            let duration =
                phase::phase_duration_ms(self.snapshot.phase, self.snapshot.settings());
            self.snapshot.start_epoch_ms =
                Some(now.saturating_sub(duration.saturating_sub(self.snapshot.time_left_ms)));
        }

        self.snapshot.is_running = true;
        if self.snapshot.session_start_epoch_ms.is_none() {
            self.snapshot.session_start_epoch_ms = Some(now);
        }
        self.notify();
    }

    /// Freeze the countdown. No-op unless running.
    pub fn pause(&mut self) {
        if !self.snapshot.is_running {
            return;
        }
        self.snapshot.is_running = false;
        self.notify();
    }

    /// Replace the snapshot with a fresh idle one built from the current
    /// settings.
    pub fn reset(&mut self) {
        self.snapshot = TimerSnapshot::initial(self.snapshot.settings());
        self.notify();
    }

    /// Pause if running, start otherwise. Calls within 100 ms of the last
    /// accepted toggle are dropped as duplicate input events.
    pub fn toggle(&mut self) {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_toggle_ms {
            if now.saturating_sub(last) < TOGGLE_DEBOUNCE_MS {
                return;
            }
        }
        self.last_toggle_ms = Some(now);

        if self.snapshot.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Merge a settings patch, clamping each value to its floor.
    ///
    /// When idle before the first round the displayed remainder follows
    /// the new round length; a live phase keeps its remaining time.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let settings = TimerSettings::clamped(
            patch.round_time_ms.unwrap_or(self.snapshot.round_time_ms),
            patch.rest_time_ms.unwrap_or(self.snapshot.rest_time_ms),
            patch.total_rounds.unwrap_or(self.snapshot.total_rounds),
        );
        self.snapshot.round_time_ms = settings.round_time_ms;
        self.snapshot.rest_time_ms = settings.rest_time_ms;
        self.snapshot.total_rounds = settings.total_rounds;

        if self.snapshot.phase == Phase::Idle && self.snapshot.current_round == 0 {
            self.snapshot.time_left_ms = settings.round_time_ms;
        }
        self.notify();
    }

    /// Register an observer invoked with the derived view after every
    /// mutation. Observers must not panic; the engine does not catch.
    pub fn subscribe(&mut self, callback: Subscriber) -> SubscriberId {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.insert(id, callback);
        SubscriberId(id)
    }

    /// Deregister an observer. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id.0).is_some()
    }

    /// Stop the countdown and drop all subscribers. The engine stays
    /// usable but inert until started again.
    pub fn destroy(&mut self) {
        self.snapshot.is_running = false;
        self.subscribers.clear();
    }

    /// Re-evaluate elapsed time and transition conditions.
    ///
    /// Call on a fixed cadence while running; a tick on a stopped engine
    /// is a no-op, which is what makes `start()`'s idempotence guard
    /// sufficient to keep a single schedule alive.
    pub fn tick(&mut self) {
        if !self.snapshot.is_running {
            return;
        }
        let Some(start) = self.snapshot.start_epoch_ms else {
            // Running without a phase start means the engine was not
            // started properly; skip rather than guess.
            tracing::debug!("tick skipped: no phase start recorded");
            return;
        };

        let now = self.clock.now_ms();
        let duration =
            phase::phase_duration_ms(self.snapshot.phase, self.snapshot.settings());
        let elapsed = now.saturating_sub(start);
        let remaining = i64::try_from(duration)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(elapsed).unwrap_or(i64::MAX));

        self.snapshot.time_left_ms = remaining.max(0) as u64;

        // Boundary cues fire on the unclamped remainder so a late tick
        // still lands them before the transition below.
        self.check_cues(remaining);

        if phase::phase_complete(remaining) {
            self.complete_phase(now);
            return;
        }
        self.notify();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn check_cues(&mut self, remaining_ms: i64) {
        match self.snapshot.phase {
            Phase::Rest
                if remaining_ms <= READY_TIME_MS as i64
                    && !self.snapshot.ready_sound_played =>
            {
                self.sink.play_ready();
                self.snapshot.ready_sound_played = true;
            }
            Phase::Work
                if remaining_ms <= SOON_TIME_MS as i64
                    && !self.snapshot.soon_sound_played =>
            {
                self.sink.play_soon();
                self.snapshot.soon_sound_played = true;
            }
            _ => {}
        }
    }

    fn complete_phase(&mut self, now_ms: u64) {
        let next = phase::next_phase(
            self.snapshot.phase,
            self.snapshot.current_round,
            self.snapshot.total_rounds,
        );

        // Exit cue: leaving Ready or Rest rings the round-start bell,
        // leaving Work rings the round-end bell whether or not the
        // session also ends.
        match self.snapshot.phase {
            Phase::Ready | Phase::Rest => self.sink.play_start(),
            Phase::Work => self.sink.play_finish(),
            Phase::Idle => {}
        }

        if next == Phase::Idle {
            // Session complete: back to a fresh idle snapshot.
            self.reset();
            return;
        }
        self.snapshot = phase::transition(&self.snapshot, next, now_ms);
        self.notify();
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let view = TimerView::derive(&self.snapshot, self.wall_now());
        for callback in self.subscribers.values_mut() {
            callback(&view);
        }
    }

    fn wall_now(&self) -> DateTime<Utc> {
        // Out of range only for clocks beyond chrono's ±262,000-year span.
        DateTime::from_timestamp_millis(self.clock.now_ms() as i64).unwrap_or_default()
    }
}
