//! Message types for the device protocol.
//!
//! Both directions are JSON objects tagged by a `type` field. Inbound frames
//! carry telemetry (`report`) and console output (`serial`); outbound frames
//! carry button presses (`button`) and the settings form (`settings`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// A field exactly as the device sent it.
///
/// Strings render without quotes and `null` renders empty. Every other JSON
/// value renders as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(pub serde_json::Value);

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            serde_json::Value::Null => Ok(()),
            other => write!(f, "{}", other),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue(serde_json::Value::String(value.to_string()))
    }
}

/// Telemetry snapshot from the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub status: FieldValue,
    pub m_vel: FieldValue,
    pub m_start: FieldValue,
    pub m_stop: FieldValue,
    pub m_pos: FieldValue,
}

/// Messages received from the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    Report(Report),
    Serial {
        text: FieldValue,
    },
    /// Any `type` this client does not know. Dispatch ignores it.
    #[serde(other)]
    Unknown,
}

/// The five actuator buttons, named by their element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonAction {
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "goHome")]
    GoHome,
    #[serde(rename = "goStart")]
    GoStart,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "stp")]
    Stop,
}

impl ButtonAction {
    pub const ALL: [ButtonAction; 5] = [
        ButtonAction::Home,
        ButtonAction::GoHome,
        ButtonAction::GoStart,
        ButtonAction::Start,
        ButtonAction::Stop,
    ];

    /// Wire name, identical to the button's element id.
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonAction::Home => "home",
            ButtonAction::GoHome => "goHome",
            ButtonAction::GoStart => "goStart",
            ButtonAction::Start => "start",
            ButtonAction::Stop => "stp",
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ButtonAction::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown button '{}', expected one of: {}",
                    s,
                    ButtonAction::ALL.map(|a| a.as_str()).join(", ")
                )
            })
    }
}

/// Values of the settings form, sent as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub velocity: String,
    pub start_pos: String,
    pub end_pos: String,
}

/// Messages sent to the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Button { action: ButtonAction },
    Settings(Settings),
}

impl OutboundMessage {
    pub fn button(action: ButtonAction) -> Self {
        OutboundMessage::Button { action }
    }

    pub fn settings(
        velocity: impl Into<String>,
        start_pos: impl Into<String>,
        end_pos: impl Into<String>,
    ) -> Self {
        OutboundMessage::Settings(Settings {
            velocity: velocity.into(),
            start_pos: start_pos.into(),
            end_pos: end_pos.into(),
        })
    }
}

/// Decode a text frame received from the device.
pub fn decode(raw: &str) -> Result<InboundMessage, ProtocolError> {
    serde_json::from_str(raw).map_err(ProtocolError::Malformed)
}

/// Encode a message as a JSON text frame.
pub fn encode(message: &OutboundMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_report() {
        let raw = r#"{"type":"report","status":"idle","m_vel":10,"m_start":0,"m_stop":100,"m_pos":42}"#;
        let msg = decode(raw).unwrap();

        let InboundMessage::Report(report) = msg else {
            panic!("expected report, got {:?}", msg);
        };
        assert_eq!(report.status.to_string(), "idle");
        assert_eq!(report.m_vel.to_string(), "10");
        assert_eq!(report.m_start.to_string(), "0");
        assert_eq!(report.m_stop.to_string(), "100");
        assert_eq!(report.m_pos.to_string(), "42");
    }

    #[test]
    fn test_report_values_are_verbatim() {
        let raw = r#"{"type":"report","status":"moving","m_vel":"12.50","m_start":-3,"m_stop":1.5,"m_pos":null}"#;
        let InboundMessage::Report(report) = decode(raw).unwrap() else {
            panic!("expected report");
        };
        assert_eq!(report.m_vel.to_string(), "12.50");
        assert_eq!(report.m_start.to_string(), "-3");
        assert_eq!(report.m_stop.to_string(), "1.5");
        assert_eq!(report.m_pos.to_string(), "");
    }

    #[test]
    fn test_decode_serial() {
        let msg = decode(r#"{"type":"serial","text":"homing done"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Serial {
                text: "homing done".into()
            }
        );
    }

    #[test]
    fn test_decode_serial_non_string_text() {
        let InboundMessage::Serial { text } = decode(r#"{"type":"serial","text":42}"#).unwrap()
        else {
            panic!("expected serial");
        };
        assert_eq!(text.to_string(), "42");

        let InboundMessage::Serial { text } = decode(r#"{"type":"serial","text":null}"#).unwrap()
        else {
            panic!("expected serial");
        };
        assert_eq!(text.to_string(), "");
    }

    #[test]
    fn test_decode_unknown_type() {
        let msg = decode(r#"{"type":"heartbeat","uptime":12}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode("{\"type\":\"report\",").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));

        let err = decode("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_encode_button() {
        let raw = encode(&OutboundMessage::button(ButtonAction::GoStart)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!({"type": "button", "action": "goStart"}));
    }

    #[test]
    fn test_encode_stop_uses_element_id() {
        let raw = encode(&OutboundMessage::button(ButtonAction::Stop)).unwrap();
        assert_eq!(raw, r#"{"type":"button","action":"stp"}"#);
    }

    #[test]
    fn test_encode_every_button_as_its_element_id() {
        for action in ButtonAction::ALL {
            let raw = encode(&OutboundMessage::button(action)).unwrap();
            assert_eq!(
                raw,
                format!(r#"{{"type":"button","action":"{}"}}"#, action.as_str())
            );
        }
    }

    #[test]
    fn test_encode_settings() {
        let raw = encode(&OutboundMessage::settings("20", "5", "250")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            json!({"type": "settings", "velocity": "20", "start_pos": "5", "end_pos": "250"})
        );
    }

    #[test]
    fn test_button_action_from_str() {
        for action in ButtonAction::ALL {
            assert_eq!(action.as_str().parse::<ButtonAction>().unwrap(), action);
        }
        assert!("stop".parse::<ButtonAction>().is_err());
    }
}
