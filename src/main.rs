//! fieldops: print the operations overview for a day as JSON.
//!
//! Usage: `fieldops [YYYY-MM-DD]` (defaults to today). `RUST_LOG` controls
//! log output on stderr.

use std::process::ExitCode;

use fieldops_lib::dates::parse_iso_date;
use fieldops_lib::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let today = match std::env::args().nth(1) {
        Some(arg) => match parse_iso_date(&arg) {
            Ok(date) => date,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => chrono::Local::now().date_naive(),
    };

    let state = AppState::new();
    let overview = fieldops_lib::overview(&state, today).await;

    match serde_json::to_string_pretty(&overview) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize overview: {e}");
            ExitCode::FAILURE
        }
    }
}
