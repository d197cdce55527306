//! Actuator Link CLI - Command-line interface for WebActuatorControl devices.
//!
//! Monitors a device's telemetry and serial console over its WebSocket
//! endpoint and sends button presses and settings, from a terminal or script.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so stdout stays parseable with `--json`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "actuator_link_core={level},actuator_link_cli={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Monitor(args) => {
            commands::run_monitor(args, config, cli.timeout, cli.json).await
        }
        Commands::Button(args) => {
            commands::run_button(args, config, cli.timeout, cli.json).await
        }
        Commands::Settings(args) => {
            commands::run_settings(args, config, cli.timeout, cli.json).await
        }
        Commands::Watch(args) => {
            commands::run_watch(args, config, cli.timeout, cli.json).await
        }
    }
}
