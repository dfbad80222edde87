mod config;
pub mod database;

pub use config::{Config, CueConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/cornerman[-dev]/` based on CORNERMAN_ENV.
///
/// Set CORNERMAN_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CORNERMAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("cornerman-dev")
    } else {
        base_dir.join("cornerman")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
