//! TOML-based application configuration.
//!
//! Stores the round timer defaults (round length, rest length, round
//! count), cue preferences, and the run-loop tick cadence.
//!
//! Configuration is stored at `~/.config/cornerman/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{TimerSettings, DEFAULT_REST_TIME_MS, DEFAULT_ROUND_TIME_MS};

/// Timer defaults applied to a fresh engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_round_time_ms")]
    pub round_time_ms: u64,
    #[serde(default = "default_rest_time_ms")]
    pub rest_time_ms: u64,
    /// 0 means open-ended.
    #[serde(default)]
    pub total_rounds: u32,
}

/// Cue playback preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/cornerman/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub cues: CueConfig,
    /// Tick cadence for the interactive run loop, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_round_time_ms() -> u64 {
    DEFAULT_ROUND_TIME_MS
}
fn default_rest_time_ms() -> u64 {
    DEFAULT_REST_TIME_MS
}
fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    50
}
fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            round_time_ms: default_round_time_ms(),
            rest_time_ms: default_rest_time_ms(),
            total_rounds: 0,
        }
    }
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            cues: CueConfig::default(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/cornerman"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the default on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)
    }

    /// Load from disk, falling back to the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default configuration: {e}");
            Self::default()
        })
    }

    pub(crate) fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    pub(crate) fn save_to(&self, path: &PathBuf) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Timer settings from this config, floors applied.
    pub fn settings(&self) -> TimerSettings {
        TimerSettings::clamped(
            self.timer.round_time_ms,
            self.timer.rest_time_ms,
            self.timer.total_rounds,
        )
    }

    /// Get a config value as a string by dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "timer.round_time_ms" => Some(self.timer.round_time_ms.to_string()),
            "timer.rest_time_ms" => Some(self.timer.rest_time_ms.to_string()),
            "timer.total_rounds" => Some(self.timer.total_rounds.to_string()),
            "cues.enabled" => Some(self.cues.enabled.to_string()),
            "cues.volume" => Some(self.cues.volume.to_string()),
            "tick_interval_ms" => Some(self.tick_interval_ms.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dotted key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match key {
            "timer.round_time_ms" => {
                self.timer.round_time_ms = value.parse().map_err(|_| {
                    invalid(format!("cannot parse '{value}' as milliseconds"))
                })?;
            }
            "timer.rest_time_ms" => {
                self.timer.rest_time_ms = value.parse().map_err(|_| {
                    invalid(format!("cannot parse '{value}' as milliseconds"))
                })?;
            }
            "timer.total_rounds" => {
                self.timer.total_rounds = value
                    .parse()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a round count")))?;
            }
            "cues.enabled" => {
                self.cues.enabled = value
                    .parse()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a bool")))?;
            }
            "cues.volume" => {
                self.cues.volume = value
                    .parse()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a volume")))?;
            }
            "tick_interval_ms" => {
                self.tick_interval_ms = value.parse().map_err(|_| {
                    invalid(format!("cannot parse '{value}' as milliseconds"))
                })?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{MIN_REST_TIME_MS, MIN_ROUND_TIME_MS};

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[timer]\ntotal_rounds = 5\n").unwrap();
        assert_eq!(cfg.timer.total_rounds, 5);
        assert_eq!(cfg.timer.round_time_ms, DEFAULT_ROUND_TIME_MS);
        assert_eq!(cfg.tick_interval_ms, 100);
        assert!(cfg.cues.enabled);
    }

    #[test]
    fn settings_apply_floors() {
        let mut cfg = Config::default();
        cfg.timer.round_time_ms = 1;
        cfg.timer.rest_time_ms = 1;
        let s = cfg.settings();
        assert_eq!(s.round_time_ms, MIN_ROUND_TIME_MS);
        assert_eq!(s.rest_time_ms, MIN_REST_TIME_MS);
    }

    #[test]
    fn get_supports_dotted_keys() {
        let cfg = Config::default();
        assert_eq!(
            cfg.get("timer.round_time_ms").as_deref(),
            Some("300000")
        );
        assert_eq!(cfg.get("cues.enabled").as_deref(), Some("true"));
        assert!(cfg.get("timer.missing").is_none());
    }

    #[test]
    fn load_from_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
