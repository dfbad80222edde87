//! Session finish-time projection.
//!
//! Estimates when a bounded session will complete, assuming no further
//! pauses. Open-ended sessions (`total_rounds == 0`) have no projection.

use chrono::{DateTime, TimeDelta, Utc};

use super::phase::{Phase, TimerSnapshot, READY_TIME_MS};

/// Milliseconds until the session completes, or `None` when open-ended.
///
/// Every yet-to-start round contributes one preceding rest and one round;
/// the final round's exit goes straight to Idle, so no rest is ever
/// counted after the round that reaches `total_rounds`.
pub fn remaining_session_ms(snapshot: &TimerSnapshot) -> Option<u64> {
    if snapshot.total_rounds == 0 {
        return None;
    }

    let round = snapshot.round_time_ms;
    let rest = snapshot.rest_time_ms;
    let total = u64::from(snapshot.total_rounds);
    let done = u64::from(snapshot.current_round);

    let future_ms = match snapshot.phase {
        // Not started: the ready countdown is still ahead.
        Phase::Idle => READY_TIME_MS
            .saturating_add(total.saturating_mul(round))
            .saturating_add(total.saturating_sub(1).saturating_mul(rest)),
        Phase::Ready => snapshot
            .time_left_ms
            .saturating_add(total.saturating_mul(round))
            .saturating_add(total.saturating_sub(1).saturating_mul(rest)),
        Phase::Rest => {
            // `done` rounds are complete; the rest in progress precedes
            // round done+1.
            let to_start = total.saturating_sub(done);
            snapshot
                .time_left_ms
                .saturating_add(to_start.saturating_mul(round))
                .saturating_add(to_start.saturating_sub(1).saturating_mul(rest))
        }
        Phase::Work => {
            let after = total.saturating_sub(done);
            snapshot
                .time_left_ms
                .saturating_add(after.saturating_mul(round.saturating_add(rest)))
        }
    };

    Some(future_ms)
}

/// Projected wall-clock completion of a bounded session.
///
/// Never earlier than `now`.
pub fn projected_finish(snapshot: &TimerSnapshot, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let ms = remaining_session_ms(snapshot)?;
    let delta = TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX));
    now.checked_add_signed(delta).or(Some(DateTime::<Utc>::MAX_UTC))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::phase::{transition, TimerSettings};

    fn snapshot_3x60() -> TimerSnapshot {
        TimerSnapshot::initial(TimerSettings::clamped(60_000, 10_000, 3))
    }

    #[test]
    fn open_ended_has_no_projection() {
        let snap = TimerSnapshot::initial(TimerSettings::default());
        assert_eq!(remaining_session_ms(&snap), None);
        assert_eq!(projected_finish(&snap, Utc::now()), None);
    }

    #[test]
    fn idle_counts_ready_all_rounds_and_gaps() {
        // 3s ready + 3 rounds of 60s + 2 rests of 10s.
        assert_eq!(remaining_session_ms(&snapshot_3x60()), Some(203_000));
    }

    #[test]
    fn ready_uses_its_remaining_time() {
        let mut ready = transition(&snapshot_3x60(), Phase::Ready, 0);
        ready.time_left_ms = 2_000;
        assert_eq!(remaining_session_ms(&ready), Some(202_000));
    }

    #[test]
    fn work_pairs_each_future_round_with_one_rest() {
        let ready = transition(&snapshot_3x60(), Phase::Ready, 0);
        let mut work = transition(&ready, Phase::Work, 3_000);
        work.time_left_ms = 30_000;
        // 30s left + 2 * (10s rest + 60s round).
        assert_eq!(remaining_session_ms(&work), Some(170_000));
    }

    #[test]
    fn final_round_has_no_trailing_rest() {
        let mut snap = snapshot_3x60();
        snap.phase = Phase::Work;
        snap.current_round = 3;
        snap.time_left_ms = 5_000;
        assert_eq!(remaining_session_ms(&snap), Some(5_000));
    }

    #[test]
    fn rest_counts_rounds_yet_to_start() {
        let mut snap = snapshot_3x60();
        snap.phase = Phase::Rest;
        snap.current_round = 1;
        snap.time_left_ms = 4_000;
        // 4s of rest + 2 rounds of 60s + the one rest between them.
        assert_eq!(remaining_session_ms(&snap), Some(134_000));
    }

    #[test]
    fn projection_is_now_plus_remaining() {
        let snap = snapshot_3x60();
        let now = Utc::now();
        let finish = projected_finish(&snap, now).unwrap();
        assert_eq!((finish - now).num_milliseconds(), 203_000);
    }

    #[test]
    fn projection_never_precedes_now() {
        let mut snap = snapshot_3x60();
        snap.phase = Phase::Work;
        snap.current_round = 3;
        snap.time_left_ms = 0;
        let now = Utc::now();
        assert!(projected_finish(&snap, now).unwrap() >= now);
    }

    proptest::proptest! {
        #[test]
        fn bounded_projection_is_at_or_after_now(
            phase_pick in 0usize..4,
            round in 30_000u64..10_000_000,
            rest in 10_000u64..1_000_000,
            total in 1u32..100,
            done in 0u32..100,
            left in 0u64..10_000_000,
        ) {
            let phase = [Phase::Idle, Phase::Ready, Phase::Work, Phase::Rest][phase_pick];
            let mut snap = TimerSnapshot::initial(TimerSettings::clamped(round, rest, total));
            snap.phase = phase;
            snap.current_round = done;
            snap.time_left_ms = left;
            let now = Utc::now();
            let finish = projected_finish(&snap, now).unwrap();
            proptest::prop_assert!(finish >= now);
        }
    }
}
