//! Human-readable output for CLI.

use actuator_link_core::protocol::OutboundMessage;
use actuator_link_core::{LinkState, PanelField, StatusPanel};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn state_icon(state: LinkState) -> &'static str {
        match state {
            LinkState::Connected => "[OK]",
            LinkState::Connecting => "[..]",
            LinkState::Disconnected => "[X]",
        }
    }

    fn describe(message: &OutboundMessage) -> String {
        match message {
            OutboundMessage::Button { action } => format!("button '{}'", action),
            OutboundMessage::Settings(s) => format!(
                "settings velocity={} start_pos={} end_pos={}",
                s.velocity, s.start_pos, s.end_pos
            ),
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_state(&self, url: &str, state: LinkState) -> String {
        let label = format!("{} {}", Self::state_icon(state), state);
        let label = match state {
            LinkState::Connected => label.green(),
            LinkState::Connecting => label.yellow(),
            LinkState::Disconnected => label.red(),
        };
        format!("{} {}", url.dimmed(), label)
    }

    fn format_panel(&self, panel: &StatusPanel) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(
            PanelField::ALL
                .iter()
                .map(|f| Cell::new(f.label()))
                .collect::<Vec<_>>(),
        );

        table.add_row(
            PanelField::ALL
                .iter()
                .map(|f| {
                    let cell = Cell::new(panel.field(*f));
                    if *f == PanelField::Status {
                        cell.fg(Color::Cyan)
                    } else {
                        cell
                    }
                })
                .collect::<Vec<_>>(),
        );

        table.to_string()
    }

    fn format_serial(&self, line: &str) -> String {
        format!("{} {}", "serial>".cyan(), line)
    }

    fn format_sent(&self, url: &str, message: &OutboundMessage) -> String {
        format!("{} Sent {} to {}", "[OK]".green(), Self::describe(message), url)
    }

    fn format_queued(&self, url: &str, message: &OutboundMessage) -> String {
        format!("{} Queued {} for {}", "[..]".yellow(), Self::describe(message), url)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}", "Error:".red().bold(), error)
    }
}
