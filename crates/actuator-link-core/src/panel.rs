//! Status panel: the display targets a device link writes into.
//!
//! The device page has five text targets for telemetry and one accumulating
//! serial console. [`LinkView`] is the seam the link dispatches through, and
//! [`StatusPanel`] is the in-memory rendering of that page.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::device::link::LinkState;
use crate::protocol::{InboundMessage, Report};

/// Text display targets, named by their element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PanelField {
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "m_vel")]
    Velocity,
    #[serde(rename = "m_start")]
    Start,
    #[serde(rename = "m_end")]
    End,
    #[serde(rename = "m_pos")]
    Position,
}

impl PanelField {
    pub const ALL: [PanelField; 5] = [
        PanelField::Status,
        PanelField::Velocity,
        PanelField::Start,
        PanelField::End,
        PanelField::Position,
    ];

    pub fn element_id(&self) -> &'static str {
        match self {
            PanelField::Status => "status",
            PanelField::Velocity => "m_vel",
            PanelField::Start => "m_start",
            PanelField::End => "m_end",
            PanelField::Position => "m_pos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PanelField::Status => "Status",
            PanelField::Velocity => "Velocity",
            PanelField::Start => "Start",
            PanelField::End => "End",
            PanelField::Position => "Position",
        }
    }
}

impl fmt::Display for PanelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Rendering surface for a device link.
pub trait LinkView: Send + 'static {
    /// Replace the text of a display target.
    fn set_field(&mut self, field: PanelField, value: &str);

    /// Append a line to the serial console. `line` already ends in `\n`.
    fn append_serial(&mut self, line: &str);

    /// Called once after all targets touched by one message are written.
    fn updated(&mut self) {}

    fn state_changed(&mut self, _state: LinkState) {}
}

impl<V: LinkView> LinkView for Arc<Mutex<V>> {
    fn set_field(&mut self, field: PanelField, value: &str) {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .set_field(field, value);
    }

    fn append_serial(&mut self, line: &str) {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .append_serial(line);
    }

    fn updated(&mut self) {
        self.lock().unwrap_or_else(|e| e.into_inner()).updated();
    }

    fn state_changed(&mut self, state: LinkState) {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .state_changed(state);
    }
}

/// Write a report's fields into their display targets.
///
/// `m_stop` is shown in the `m_end` target.
pub fn render_report<V: LinkView + ?Sized>(view: &mut V, report: &Report) {
    view.set_field(PanelField::Status, &report.status.to_string());
    view.set_field(PanelField::Velocity, &report.m_vel.to_string());
    view.set_field(PanelField::Start, &report.m_start.to_string());
    view.set_field(PanelField::End, &report.m_stop.to_string());
    view.set_field(PanelField::Position, &report.m_pos.to_string());
}

/// Apply an inbound message to a view.
///
/// Returns `false` when the message type is unknown and nothing changed.
pub fn dispatch<V: LinkView + ?Sized>(view: &mut V, message: &InboundMessage) -> bool {
    match message {
        InboundMessage::Report(report) => {
            render_report(view, report);
            view.updated();
            true
        }
        InboundMessage::Serial { text } => {
            view.append_serial(&format!("{}\n", text));
            view.updated();
            true
        }
        InboundMessage::Unknown => false,
    }
}

/// In-memory copy of the device page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusPanel {
    pub status: String,
    pub m_vel: String,
    pub m_start: String,
    pub m_end: String,
    pub m_pos: String,
    #[serde(rename = "serial-box")]
    pub serial_box: String,
    #[serde(skip)]
    pub state: LinkState,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: PanelField) -> &str {
        match field {
            PanelField::Status => &self.status,
            PanelField::Velocity => &self.m_vel,
            PanelField::Start => &self.m_start,
            PanelField::End => &self.m_end,
            PanelField::Position => &self.m_pos,
        }
    }

    /// Serial console lines, oldest first.
    pub fn serial_lines(&self) -> impl Iterator<Item = &str> {
        self.serial_box.lines()
    }
}

impl LinkView for StatusPanel {
    fn set_field(&mut self, field: PanelField, value: &str) {
        let target = match field {
            PanelField::Status => &mut self.status,
            PanelField::Velocity => &mut self.m_vel,
            PanelField::Start => &mut self.m_start,
            PanelField::End => &mut self.m_end,
            PanelField::Position => &mut self.m_pos,
        };
        target.clear();
        target.push_str(value);
    }

    fn append_serial(&mut self, line: &str) {
        self.serial_box.push_str(line);
    }

    fn state_changed(&mut self, state: LinkState) {
        self.state = state;
    }
}
