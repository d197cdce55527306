//! CLI argument definitions using clap.

use std::path::PathBuf;

use actuator_link_core::protocol::ButtonAction;
use clap::{Args, Parser, Subcommand};

/// Actuator Link CLI - monitor and drive WebActuatorControl devices
#[derive(Parser, Debug)]
#[command(name = "actuator-link")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output as newline-delimited JSON (NDJSON)
    #[arg(long, global = true)]
    pub json: bool,

    /// Connect timeout in milliseconds
    #[arg(long, global = true, env = "ACTUATOR_LINK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Config file (default: platform config dir/actuator-link/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep a link open, showing telemetry and serial output
    Monitor(MonitorArgs),

    /// Press one of the actuator buttons
    #[command(allow_missing_positional = true)]
    Button(ButtonArgs),

    /// Submit the settings form
    Settings(SettingsArgs),

    /// Open one connection and print incoming messages
    Watch(WatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Device host or IP address (falls back to the config file)
    #[arg(env = "ACTUATOR_LINK_HOST")]
    pub host: Option<String>,
}

// ==================== Monitor ====================

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Delay before reconnecting after a close, in milliseconds
    #[arg(long)]
    pub retry_ms: Option<u64>,

    /// Only show serial lines matching this pattern (glob-style, e.g. "*error*")
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Read button presses and settings from stdin
    #[arg(short, long)]
    pub interactive: bool,
}

// ==================== Button ====================

#[derive(Args, Debug)]
pub struct ButtonArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Button id: home, goHome, goStart, start, stp
    #[arg(value_name = "ACTION")]
    pub action: ButtonAction,
}

// ==================== Settings ====================

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Velocity
    #[arg(long)]
    pub velocity: String,

    /// Start position
    #[arg(long)]
    pub start_pos: String,

    /// End position
    #[arg(long)]
    pub end_pos: String,
}

// ==================== Watch ====================

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of messages to print (default: stop after the first report)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_button() {
        let cli = Cli::try_parse_from(["actuator-link", "button", "192.168.4.1", "stp"]).unwrap();
        match cli.command {
            Commands::Button(args) => {
                assert_eq!(args.target.host.as_deref(), Some("192.168.4.1"));
                assert_eq!(args.action, ButtonAction::Stop);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_button_rejects_unknown_action() {
        let result =
            Cli::try_parse_from(["actuator-link", "button", "192.168.4.1", "jump"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["actuator-link", "button", "192.168.4.1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_button_without_host() {
        let cli = Cli::try_parse_from(["actuator-link", "button", "goHome"]).unwrap();
        match cli.command {
            Commands::Button(args) => {
                assert_eq!(args.action, ButtonAction::GoHome);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_settings_with_globals() {
        let cli = Cli::try_parse_from([
            "actuator-link",
            "settings",
            "actuator.local",
            "--velocity",
            "20",
            "--start-pos",
            "0",
            "--end-pos",
            "300",
            "--json",
            "--timeout",
            "1500",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.timeout, Some(1500));
        match cli.command {
            Commands::Settings(args) => {
                assert_eq!(args.velocity, "20");
                assert_eq!(args.start_pos, "0");
                assert_eq!(args.end_pos, "300");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
