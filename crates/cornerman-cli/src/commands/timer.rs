use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use cornerman_core::storage::{Config, Database};
use cornerman_core::timer::{SettingsPatch, TimerEngine, TimerSnapshot};
use cornerman_core::{CueSink, SilentSink};

use crate::bell::TerminalBell;

const SNAPSHOT_KEY: &str = "timer_snapshot";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a session, or resume a paused one
    Start,
    /// Pause the countdown
    Pause,
    /// Toggle between start and pause
    Toggle,
    /// Reset to idle
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Run the timer interactively in the foreground
    Run {
        /// Work round length in seconds
        #[arg(long)]
        round: Option<u64>,
        /// Rest length in seconds
        #[arg(long)]
        rest: Option<u64>,
        /// Number of rounds, 0 for open-ended
        #[arg(long)]
        rounds: Option<u32>,
    },
}

fn cue_sink(config: &Config) -> Box<dyn CueSink> {
    if config.cues.enabled {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentSink)
    }
}

fn load_engine(db: &Database, config: &Config) -> TimerEngine {
    if let Ok(Some(json)) = db.kv_get(SNAPSHOT_KEY) {
        if let Ok(snapshot) = serde_json::from_str::<TimerSnapshot>(&json) {
            return TimerEngine::from_snapshot(snapshot, cue_sink(config));
        }
    }
    TimerEngine::new(config.settings(), cue_sink(config))
}

fn save_engine(db: &Database, engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine.snapshot())?;
    db.kv_set(SNAPSHOT_KEY, &json)?;
    Ok(())
}

fn print_state(engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&engine.state())?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut engine = load_engine(&db, &config);

    match action {
        TimerAction::Start => {
            engine.start();
            print_state(&engine)?;
        }
        TimerAction::Pause => {
            // Catch up wall-clock time before freezing the remainder.
            engine.tick();
            engine.pause();
            print_state(&engine)?;
        }
        TimerAction::Toggle => {
            engine.tick();
            engine.toggle();
            print_state(&engine)?;
        }
        TimerAction::Reset => {
            engine.reset();
            print_state(&engine)?;
        }
        TimerAction::Status => {
            engine.tick();
            print_state(&engine)?;
        }
        TimerAction::Run {
            round,
            rest,
            rounds,
        } => {
            engine.update_settings(SettingsPatch {
                round_time_ms: round.map(|s| s.saturating_mul(1000)),
                rest_time_ms: rest.map(|s| s.saturating_mul(1000)),
                total_rounds: rounds,
            });
            run_session(&mut engine, config.tick_interval_ms)?;
        }
    }

    save_engine(&db, &engine)?;
    Ok(())
}

/// Foreground session: a tokio interval drives `tick()` and a live
/// status line follows the engine through the observer hook. Ctrl-C
/// pauses; the saved snapshot resumes on the next invocation.
fn run_session(
    engine: &mut TimerEngine,
    tick_interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let subscription = engine.subscribe(Box::new(|view| {
            let finish = view
                .finish_time
                .map(|t| t.with_timezone(&chrono::Local).format("  ends %H:%M").to_string())
                .unwrap_or_default();
            print!("\r\x1b[2K{} {}{}", view.status, view.display, finish);
            let _ = std::io::stdout().flush();
        }));

        engine.start();

        let mut interval =
            tokio::time::interval(Duration::from_millis(tick_interval_ms.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    engine.tick();
                    if !engine.is_running() {
                        println!("\nsession complete");
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    engine.pause();
                    println!("\npaused");
                    break;
                }
            }
        }

        engine.unsubscribe(subscription);
        Ok(())
    })
}
