//! Audio cue capability.
//!
//! The engine never talks to an audio backend. It fires cues through this
//! trait and the host decides how to make noise (terminal bell, desktop
//! notification, speaker). Playback failure stays on the host side:
//! implementations log and swallow, so a broken speaker can never stall a
//! tick or a transition.

/// Fire-and-forget cue triggers, one per sound.
pub trait CueSink {
    /// "Get ready" chime: session start and the tail of each rest.
    fn play_ready(&self);
    /// Warning near the end of a work round.
    fn play_soon(&self);
    /// Round-start bell, rung when Ready or Rest runs out.
    fn play_start(&self);
    /// Round-end bell, also the session-complete sound.
    fn play_finish(&self);
}

/// Sink that drops every cue. For headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl CueSink for SilentSink {
    fn play_ready(&self) {}
    fn play_soon(&self) {}
    fn play_start(&self) {}
    fn play_finish(&self) {}
}
