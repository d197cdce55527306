//! Command implementations.

pub mod monitor;
pub mod send;
pub mod watch;

pub use monitor::run_monitor;
pub use send::{run_button, run_settings};
pub use watch::run_watch;

use std::path::Path;

use actuator_link_core::LinkConfig;

use crate::cli::TargetArgs;
use crate::error::CliError;

/// Build the link config: defaults, then the config file, then flags and
/// environment.
pub fn resolve_config(
    config_path: Option<&Path>,
    target: &TargetArgs,
    timeout: Option<u64>,
) -> Result<LinkConfig, CliError> {
    let mut config = match config_path {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::load_default()?,
    };

    if let Some(host) = &target.host {
        config.host = host.clone();
    }
    if let Some(timeout) = timeout {
        config.connect_timeout_ms = timeout;
    }

    if config.host.trim().is_empty() {
        return Err(CliError::InvalidArgument(
            "No device host given (pass <HOST>, set ACTUATOR_LINK_HOST or add \"host\" to the config file)"
                .to_string(),
        ));
    }

    Ok(config)
}
