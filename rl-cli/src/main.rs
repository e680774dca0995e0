//! Record Ledger CLI Entry Point
//!
//! Configuration is loaded from environment variables (via .env file).
//! Command-line arguments override environment variables.

use clap::Parser;
use rl_cli::{handler, Cli};
use rl_store::{init_logging, LogConfig, LogLevel};

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // A log profile in the environment turns logging on without -v
    if cli.verbose || std::env::var_os("RL_LOG_PROFILE").is_some() {
        let verbose = cli.verbose;
        let result = LogConfig::from_env()
            .map(|config| {
                if verbose {
                    config.with_level(LogLevel::Debug)
                } else {
                    config
                }
            })
            .and_then(|config| init_logging(&config));
        if let Err(e) = result {
            eprintln!("Warning: {}", e);
        }
    }

    if let Err(e) = handler::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
