//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use actuator_link_core::protocol::OutboundMessage;
use actuator_link_core::{LinkState, StatusPanel};

/// Output formatter trait
pub trait OutputFormatter: Send {
    /// Format a link state transition
    fn format_state(&self, url: &str, state: LinkState) -> String;

    /// Format the telemetry targets of a status panel
    fn format_panel(&self, panel: &StatusPanel) -> String;

    /// Format one serial console line (without its trailing newline)
    fn format_serial(&self, line: &str) -> String;

    /// Format a message that was sent to the device
    fn format_sent(&self, url: &str, message: &OutboundMessage) -> String;

    /// Format a message handed to a live link but not yet written.
    ///
    /// The link drops it if the socket closes first.
    fn format_queued(&self, url: &str, message: &OutboundMessage) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;

    /// Format an error
    fn format_error(&self, error: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
