//! One-shot button and settings commands.

use std::path::Path;
use std::time::Duration;

use actuator_link_core::device::send_message;
use actuator_link_core::protocol::OutboundMessage;
use actuator_link_core::LinkConfig;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{ButtonArgs, SettingsArgs};
use crate::commands::resolve_config;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the button command
pub async fn run_button(
    args: ButtonArgs,
    config_path: Option<&Path>,
    timeout: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let config = resolve_config(config_path, &args.target, timeout)?;
    send_one(&config, OutboundMessage::button(args.action), json).await
}

/// Run the settings command
pub async fn run_settings(
    args: SettingsArgs,
    config_path: Option<&Path>,
    timeout: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let config = resolve_config(config_path, &args.target, timeout)?;
    let message = OutboundMessage::settings(args.velocity, args.start_pos, args.end_pos);
    send_one(&config, message, json).await
}

async fn send_one(
    config: &LinkConfig,
    message: OutboundMessage,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let url = config.url()?;

    let spinner = (!json).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Connecting to {}...", url));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = send_message(config, &message).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result?;

    println!("{}", formatter.format_sent(&url, &message));
    Ok(())
}
