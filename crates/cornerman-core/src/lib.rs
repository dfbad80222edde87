//! # Cornerman Core Library
//!
//! Core business logic for Cornerman, a round timer for combat-sports
//! training: a countdown cycling Ready -> Work -> Rest for a configured
//! number of rounds (or forever), with audible cues and a projected
//! session-finish time. All operations are available through the
//! standalone CLI binary; any GUI would be a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer engine**: a wall-clock-based state machine that requires the
//!   host to invoke `tick()` periodically while running
//! - **Phase machine**: pure transition functions the engine consults
//! - **Audio cues**: a capability trait the host implements; the engine
//!   fires, the host makes noise
//! - **Storage**: TOML configuration and a SQLite kv store the CLI uses
//!   to carry a session across invocations
//!
//! ## Key components
//!
//! - [`TimerEngine`]: core timer state machine driver
//! - [`TimerSnapshot`]: the complete timer state
//! - [`CueSink`]: injected audio capability
//! - [`Config`]: application configuration management

pub mod audio;
pub mod error;
pub mod storage;
pub mod timer;

pub use audio::{CueSink, SilentSink};
pub use error::{ConfigError, StorageError};
pub use storage::{Config, Database};
pub use timer::{
    Clock, Phase, SettingsPatch, SubscriberId, SystemClock, TimerEngine, TimerSettings,
    TimerSnapshot, TimerView,
};
