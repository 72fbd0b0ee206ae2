//! taskhub - task marketplace client
//!
//! Runs one command against the API and prints the result as JSON.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use taskhub::cli::{execute, Cli};
use taskhub::{logging, TaskHub};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let store = match cli.store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let hub = match TaskHub::new(&cli.config(), Arc::new(store)) {
        Ok(hub) => hub,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(&cli.command, &hub).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e.user_message(cli.command.fallback_message()));
            ExitCode::FAILURE
        }
    }
}
