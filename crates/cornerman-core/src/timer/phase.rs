//! Phase state machine for the round timer.
//!
//! Pure functions over an immutable snapshot. Nothing here reads a clock
//! or touches I/O; the engine samples wall-clock time and passes it in.
//!
//! A session walks Ready -> (Work -> Rest)* -> Idle. Work entry is the
//! only transition that increments the round counter.

use serde::{Deserialize, Serialize};

/// Countdown before the first round, in milliseconds.
pub const READY_TIME_MS: u64 = 3_000;
/// Warning window before the end of a work round, in milliseconds.
pub const SOON_TIME_MS: u64 = 10_000;
/// Floor for the configured work-round length.
pub const MIN_ROUND_TIME_MS: u64 = 30_000;
/// Floor for the configured rest length.
pub const MIN_REST_TIME_MS: u64 = 10_000;

/// Default work round: five minutes.
pub const DEFAULT_ROUND_TIME_MS: u64 = 5 * 60 * 1000;
/// Default rest: twenty seconds.
pub const DEFAULT_REST_TIME_MS: u64 = 20 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Ready,
    Work,
    Rest,
}

/// Clamped timer settings.
///
/// Sub-floor durations are raised to the floor, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub round_time_ms: u64,
    pub rest_time_ms: u64,
    /// 0 means open-ended; otherwise a hard cap.
    pub total_rounds: u32,
}

impl TimerSettings {
    pub fn clamped(round_time_ms: u64, rest_time_ms: u64, total_rounds: u32) -> Self {
        Self {
            round_time_ms: round_time_ms.max(MIN_ROUND_TIME_MS),
            rest_time_ms: rest_time_ms.max(MIN_REST_TIME_MS),
            total_rounds,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            round_time_ms: DEFAULT_ROUND_TIME_MS,
            rest_time_ms: DEFAULT_REST_TIME_MS,
            total_rounds: 0,
        }
    }
}

/// The complete timer state.
///
/// Replaced wholesale on every transition; the engine never hands out a
/// mutable reference. Serialized by the CLI so a session survives across
/// one-shot invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    /// Rounds fully started; 0 before the first work phase begins.
    pub current_round: u32,
    pub total_rounds: u32,
    pub round_time_ms: u64,
    pub rest_time_ms: u64,
    /// Remaining time in the current phase, clamped to >= 0.
    pub time_left_ms: u64,
    pub is_running: bool,
    /// Epoch ms when the current phase began, rebuilt on resume.
    #[serde(default)]
    pub start_epoch_ms: Option<u64>,
    /// Epoch ms when the session began (first start).
    #[serde(default)]
    pub session_start_epoch_ms: Option<u64>,
    #[serde(default)]
    pub ready_sound_played: bool,
    #[serde(default)]
    pub soon_sound_played: bool,
}

impl TimerSnapshot {
    /// Fresh idle snapshot for the given settings.
    pub fn initial(settings: TimerSettings) -> Self {
        Self {
            phase: Phase::Idle,
            current_round: 0,
            total_rounds: settings.total_rounds,
            round_time_ms: settings.round_time_ms,
            rest_time_ms: settings.rest_time_ms,
            time_left_ms: settings.round_time_ms,
            is_running: false,
            start_epoch_ms: None,
            session_start_epoch_ms: None,
            ready_sound_played: false,
            soon_sound_played: false,
        }
    }

    pub fn settings(&self) -> TimerSettings {
        TimerSettings {
            round_time_ms: self.round_time_ms,
            rest_time_ms: self.rest_time_ms,
            total_rounds: self.total_rounds,
        }
    }
}

/// Duration of `phase` under the given settings.
///
/// Idle reports the round length so an idle display shows the configured
/// round.
pub fn phase_duration_ms(phase: Phase, settings: TimerSettings) -> u64 {
    match phase {
        Phase::Ready => READY_TIME_MS,
        Phase::Work => settings.round_time_ms,
        Phase::Rest => settings.rest_time_ms,
        Phase::Idle => settings.round_time_ms,
    }
}

/// Whether the current phase has run out. `remaining_ms` is unclamped.
pub fn phase_complete(remaining_ms: i64) -> bool {
    remaining_ms <= 0
}

/// Successor of `phase` once its countdown reaches zero.
///
/// A bounded session leaves Work for Idle when the cap is reached; the
/// last round never gets a trailing rest.
pub fn next_phase(phase: Phase, current_round: u32, total_rounds: u32) -> Phase {
    match phase {
        Phase::Ready => Phase::Work,
        Phase::Work => {
            if total_rounds > 0 && current_round >= total_rounds {
                Phase::Idle
            } else {
                Phase::Rest
            }
        }
        Phase::Rest => Phase::Work,
        // Idle has no natural successor; a start() call enters Ready.
        Phase::Idle => Phase::Ready,
    }
}

/// Build the snapshot for entering `next` at wall-clock `now_ms`.
///
/// Both cue guards are cleared on every transition. Entering Ready marks
/// its own guard as played: the phase start doubles as the ready cue.
pub fn transition(snapshot: &TimerSnapshot, next: Phase, now_ms: u64) -> TimerSnapshot {
    let mut out = snapshot.clone();
    out.phase = next;
    out.start_epoch_ms = Some(now_ms);
    out.ready_sound_played = false;
    out.soon_sound_played = false;

    match next {
        Phase::Ready => {
            out.time_left_ms = READY_TIME_MS;
            out.current_round = 0;
            out.ready_sound_played = true;
        }
        Phase::Work => {
            out.time_left_ms = snapshot.round_time_ms;
            out.current_round = snapshot.current_round + 1;
        }
        Phase::Rest => {
            // current_round stays: it names the round just completed.
            out.time_left_ms = snapshot.rest_time_ms;
        }
        Phase::Idle => {
            out.time_left_ms = snapshot.round_time_ms;
            out.current_round = 0;
            out.is_running = false;
            out.start_epoch_ms = None;
            out.session_start_epoch_ms = None;
        }
    }
    out
}
