mod clock;
mod engine;
mod finish;
mod phase;
mod view;

pub use clock::{Clock, SystemClock};
pub use engine::{SettingsPatch, SubscriberId, TimerEngine};
pub use finish::{projected_finish, remaining_session_ms};
pub use phase::{
    next_phase, phase_complete, phase_duration_ms, transition, Phase, TimerSettings,
    TimerSnapshot, DEFAULT_REST_TIME_MS, DEFAULT_ROUND_TIME_MS, MIN_REST_TIME_MS,
    MIN_ROUND_TIME_MS, READY_TIME_MS, SOON_TIME_MS,
};
pub use view::{format_time, TimerView};
