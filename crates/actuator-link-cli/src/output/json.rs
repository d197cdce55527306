//! NDJSON output for CLI.
//!
//! Every formatted value is one line so a monitor session can be piped
//! into line-oriented tools.

use actuator_link_core::protocol::OutboundMessage;
use actuator_link_core::{LinkState, PanelField, StatusPanel};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn event(kind: &str, fields: Value) -> String {
        let mut map = Map::new();
        map.insert("event".to_string(), json!(kind));
        map.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
        if let Value::Object(fields) = fields {
            map.extend(fields);
        }
        Self::to_json(&Value::Object(map))
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_state(&self, url: &str, state: LinkState) -> String {
        Self::event("state", json!({ "url": url, "state": state }))
    }

    fn format_panel(&self, panel: &StatusPanel) -> String {
        let fields: Map<String, Value> = PanelField::ALL
            .iter()
            .map(|f| (f.element_id().to_string(), json!(panel.field(*f))))
            .collect();
        Self::event("report", Value::Object(fields))
    }

    fn format_serial(&self, line: &str) -> String {
        Self::event("serial", json!({ "text": line }))
    }

    fn format_sent(&self, url: &str, message: &OutboundMessage) -> String {
        Self::event("sent", json!({ "url": url, "message": message }))
    }

    fn format_queued(&self, url: &str, message: &OutboundMessage) -> String {
        Self::event("queued", json!({ "url": url, "message": message }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::event("message", json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        Self::event("error", json!({ "error": error }))
    }
}
