//! Derived, host-facing timer state.
//!
//! What subscribers receive and what the CLI prints: the raw snapshot
//! fields plus the formatted countdown, a status line, and the projected
//! finish time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::finish::projected_finish;
use super::phase::{Phase, TimerSnapshot};

#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub phase: Phase,
    pub current_round: u32,
    pub total_rounds: u32,
    pub round_time_ms: u64,
    pub rest_time_ms: u64,
    pub time_left_ms: u64,
    pub is_running: bool,
    /// `mm:ss` rendering of `time_left_ms`.
    pub display: String,
    /// Human status line, e.g. "Round 2" or "Paused - Rest 1".
    pub status: String,
    /// Projected completion; `None` for open-ended sessions.
    pub finish_time: Option<DateTime<Utc>>,
}

impl TimerView {
    pub fn derive(snapshot: &TimerSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            phase: snapshot.phase,
            current_round: snapshot.current_round,
            total_rounds: snapshot.total_rounds,
            round_time_ms: snapshot.round_time_ms,
            rest_time_ms: snapshot.rest_time_ms,
            time_left_ms: snapshot.time_left_ms,
            is_running: snapshot.is_running,
            display: format_time(snapshot.time_left_ms),
            status: status_text(snapshot),
            finish_time: projected_finish(snapshot, now),
        }
    }
}

/// Format a millisecond countdown as `mm:ss`.
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

fn status_text(snapshot: &TimerSnapshot) -> String {
    if snapshot.is_running {
        match snapshot.phase {
            Phase::Ready => "Get Ready".into(),
            Phase::Work => format!("Round {}", snapshot.current_round),
            Phase::Rest if snapshot.current_round > 0 => {
                format!("Rest {}", snapshot.current_round)
            }
            Phase::Rest => "Rest".into(),
            Phase::Idle => "Running".into(),
        }
    } else if snapshot.phase == Phase::Idle {
        "Stopped".into()
    } else {
        match snapshot.phase {
            Phase::Ready => "Paused - Get Ready".into(),
            Phase::Work => format!("Paused - Round {}", snapshot.current_round),
            Phase::Rest if snapshot.current_round > 0 => {
                format!("Paused - Rest {}", snapshot.current_round)
            }
            _ => "Paused".into(),
        }
    }
}
