//! Live monitor: keeps a device link open and renders it in the terminal.

use std::future::Future;
use std::io::{self, Write};
use std::path::Path;

use actuator_link_core::protocol::{ButtonAction, OutboundMessage};
use actuator_link_core::{DeviceLink, LinkState, LinkView, PanelField, StatusPanel};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::cli::MonitorArgs;
use crate::commands::resolve_config;
use crate::error::CliError;
use crate::output::{get_formatter, OutputFormatter};

const CONSOLE_HELP: &str = "Commands: home | goHome | goStart | start | stp | \
settings <velocity> <start_pos> <end_pos> | help | quit";

/// Link view that prints to the terminal as the device updates.
struct TerminalView {
    url: String,
    formatter: Box<dyn OutputFormatter>,
    panel: StatusPanel,
    report_pending: bool,
    filter: Option<Regex>,
}

impl TerminalView {
    fn new(url: String, formatter: Box<dyn OutputFormatter>, filter: Option<Regex>) -> Self {
        Self {
            url,
            formatter,
            panel: StatusPanel::new(),
            report_pending: false,
            filter,
        }
    }
}

impl LinkView for TerminalView {
    fn set_field(&mut self, field: PanelField, value: &str) {
        self.panel.set_field(field, value);
        self.report_pending = true;
    }

    fn append_serial(&mut self, line: &str) {
        let line = line.trim_end_matches('\n');
        if self.filter.as_ref().map_or(true, |re| re.is_match(line)) {
            println!("{}", self.formatter.format_serial(line));
        }
    }

    fn updated(&mut self) {
        if self.report_pending {
            self.report_pending = false;
            println!("{}", self.formatter.format_panel(&self.panel));
        }
        io::stdout().flush().ok();
    }

    fn state_changed(&mut self, state: LinkState) {
        self.panel.state_changed(state);
        println!("{}", self.formatter.format_state(&self.url, state));
        io::stdout().flush().ok();
    }
}

/// A line typed at the interactive console.
#[derive(Debug, PartialEq)]
enum ConsoleCommand {
    Send(OutboundMessage),
    Help,
    Quit,
    Empty,
}

fn parse_console_line(line: &str) -> Result<ConsoleCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        [] => Ok(ConsoleCommand::Empty),
        ["help"] | ["?"] => Ok(ConsoleCommand::Help),
        ["quit"] | ["exit"] => Ok(ConsoleCommand::Quit),
        ["settings", velocity, start_pos, end_pos] => Ok(ConsoleCommand::Send(
            OutboundMessage::settings(*velocity, *start_pos, *end_pos),
        )),
        ["settings", ..] => Err("usage: settings <velocity> <start_pos> <end_pos>".to_string()),
        [button] => button
            .parse::<ButtonAction>()
            .map(|action| ConsoleCommand::Send(OutboundMessage::button(action))),
        _ => Err(format!("unrecognised input '{}'", line.trim())),
    }
}

/// Turn a glob-style pattern into an unanchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, CliError> {
    let regex_pattern = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    Regex::new(&regex_pattern)
        .map_err(|e| CliError::InvalidArgument(format!("Invalid filter '{}': {}", pattern, e)))
}

async fn next_line(input: &mut Option<Lines<BufReader<Stdin>>>) -> io::Result<Option<String>> {
    match input {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

/// Hand a console message to the link.
///
/// The link only accepts it while connected, and drops it if the socket
/// closes before it is written, so success is reported as queued.
fn queue_from_console(
    link: &DeviceLink,
    formatter: &dyn OutputFormatter,
    message: OutboundMessage,
) -> Result<String, String> {
    let queued = formatter.format_queued(link.url(), &message);
    link.send(message)
        .map(|()| queued)
        .map_err(|e| formatter.format_error(&e.to_string()))
}

/// Read console lines until `stop` resolves, the input ends or `quit`.
///
/// `stop` is polled across iterations, so a signal that arrives while a line
/// is being handled still ends the loop.
async fn console_loop<S: Future>(
    link: &DeviceLink,
    formatter: &dyn OutputFormatter,
    mut input: Option<Lines<BufReader<Stdin>>>,
    stop: S,
) -> Result<(), CliError> {
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => return Ok(()),
            line = next_line(&mut input) => {
                let Some(line) = line? else {
                    return Ok(());
                };

                match parse_console_line(&line) {
                    Ok(ConsoleCommand::Send(message)) => {
                        match queue_from_console(link, formatter, message) {
                            Ok(queued) => println!("{}", queued),
                            Err(e) => eprintln!("{}", e),
                        }
                    }
                    Ok(ConsoleCommand::Help) => eprintln!("{}", CONSOLE_HELP),
                    Ok(ConsoleCommand::Quit) => return Ok(()),
                    Ok(ConsoleCommand::Empty) => {}
                    Err(e) => eprintln!("{}", formatter.format_error(&e)),
                }
            }
        }
    }
}

/// Run the monitor command
pub async fn run_monitor(
    args: MonitorArgs,
    config_path: Option<&Path>,
    timeout: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let mut config = resolve_config(config_path, &args.target, timeout)?;
    if let Some(retry_ms) = args.retry_ms {
        config.retry_delay_ms = retry_ms;
    }

    let filter = args.filter.as_deref().map(glob_to_regex).transpose()?;
    let formatter = get_formatter(json);

    let view = TerminalView::new(config.url()?, get_formatter(json), filter);
    let link = DeviceLink::spawn(&config, view)?;

    eprintln!(
        "{}",
        formatter.format_message(&format!("Monitoring {}. Press Ctrl+C to stop.", link.url()))
    );
    if args.interactive && !json {
        eprintln!("{}", CONSOLE_HELP);
    }

    let input = args
        .interactive
        .then(|| BufReader::new(tokio::io::stdin()).lines());

    let result = console_loop(&link, formatter.as_ref(), input, tokio::signal::ctrl_c()).await;

    link.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_buttons() {
        for action in ButtonAction::ALL {
            assert_eq!(
                parse_console_line(action.as_str()).unwrap(),
                ConsoleCommand::Send(OutboundMessage::button(action))
            );
        }
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            parse_console_line("  settings 20 0 300 ").unwrap(),
            ConsoleCommand::Send(OutboundMessage::settings("20", "0", "300"))
        );
        assert!(parse_console_line("settings 20 0").is_err());
    }

    #[test]
    fn test_parse_control_words() {
        assert_eq!(parse_console_line("").unwrap(), ConsoleCommand::Empty);
        assert_eq!(parse_console_line("quit").unwrap(), ConsoleCommand::Quit);
        assert_eq!(parse_console_line("help").unwrap(), ConsoleCommand::Help);
        assert!(parse_console_line("jump").is_err());
        assert!(parse_console_line("home now").is_err());
    }

    #[test]
    fn test_glob_filter() {
        let re = glob_to_regex("*limit?switch*").unwrap();
        assert!(re.is_match("hit limit switch at 300"));
        assert!(re.is_match("limit_switch"));
        assert!(!re.is_match("homing done"));

        let re = glob_to_regex("pos=(1)").unwrap();
        assert!(re.is_match("pos=(1)"));
    }

    fn unreachable_link() -> DeviceLink {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let host = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut config = actuator_link_core::LinkConfig::new(host);
        config.retry_delay_ms = 60_000;
        DeviceLink::spawn(&config, StatusPanel::new()).unwrap()
    }

    #[tokio::test]
    async fn test_console_loop_ends_on_stop_signal() {
        let link = unreachable_link();
        let formatter = get_formatter(true);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            stop_tx.send(()).ok();
        });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            console_loop(&link, formatter.as_ref(), None, stop_rx),
        )
        .await
        .expect("console loop did not stop");
        assert!(result.is_ok());

        link.shutdown().await;
    }

    #[tokio::test]
    async fn test_console_send_while_disconnected() {
        let link = unreachable_link();
        let formatter = get_formatter(true);

        let err = queue_from_console(
            &link,
            formatter.as_ref(),
            OutboundMessage::button(ButtonAction::Start),
        )
        .unwrap_err();
        let value: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(value["event"], "error");
        assert!(value["error"].as_str().unwrap().contains("not connected"));

        link.shutdown().await;
    }

    #[test]
    fn test_terminal_view_tracks_panel() {
        let mut view = TerminalView::new(
            "ws://10.0.0.2/ws".to_string(),
            get_formatter(true),
            None,
        );
        view.set_field(PanelField::Position, "42");
        assert!(view.report_pending);
        view.updated();
        assert!(!view.report_pending);
        assert_eq!(view.panel.m_pos, "42");

        view.state_changed(LinkState::Connected);
        assert_eq!(view.panel.state, LinkState::Connected);
    }
}
