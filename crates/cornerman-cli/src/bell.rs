//! Terminal bell cue sink.
//!
//! Rings the terminal bell and names the cue on its own line. Write
//! failures are logged and dropped -- a closed pipe must never stall a
//! tick or a phase transition.

use std::io::Write;

use cornerman_core::CueSink;

pub struct TerminalBell;

impl TerminalBell {
    fn ring(&self, label: &str) {
        let mut out = std::io::stdout();
        let result = writeln!(out, "\x07\r\x1b[2K[{label}]").and_then(|()| out.flush());
        if let Err(e) = result {
            tracing::debug!("cue '{label}' not delivered: {e}");
        }
    }
}

impl CueSink for TerminalBell {
    fn play_ready(&self) {
        self.ring("ready");
    }
    fn play_soon(&self) {
        self.ring("10 seconds");
    }
    fn play_start(&self) {
        self.ring("go");
    }
    fn play_finish(&self) {
        self.ring("time");
    }
}
