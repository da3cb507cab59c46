//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `goaltracker_core` linkage and the configured database.
//! - Keep output deterministic for quick local sanity checks.

use goaltracker_core::db::migrations::latest_version;
use goaltracker_core::{init_logging, TrackerConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("goaltracker_core ping={}", goaltracker_core::ping());
    println!("goaltracker_core version={}", goaltracker_core::core_version());

    let config = match TrackerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging init failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    let db_label = config
        .db_path
        .as_ref()
        .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string());
    match config.open_database() {
        Ok(_conn) => {
            println!("goaltracker_core db={db_label} schema_version={}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("database open failed for {db_label}: {err}");
            ExitCode::FAILURE
        }
    }
}
