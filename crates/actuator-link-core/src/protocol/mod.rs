//! Protocol layer for device communication.
//!
//! Devices exchange JSON text frames over WebSocket at ws://<host>/ws.

pub mod messages;

pub use messages::{
    decode, encode, ButtonAction, FieldValue, InboundMessage, OutboundMessage, Report, Settings,
};
