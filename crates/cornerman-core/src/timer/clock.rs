//! Wall-clock source for the engine.
//!
//! All duration math is the difference of two `now_ms()` samples (phase
//! start, current tick), so a stretch of missed ticks is caught up on the
//! next one instead of being lost.

/// Millisecond wall clock.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System time. The pre-epoch edge collapses to 0 rather than erroring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
