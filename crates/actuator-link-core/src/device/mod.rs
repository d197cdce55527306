//! Device communication layer.
//!
//! Provides single WebSocket sessions and the reconnecting device link.

pub mod connection;
pub mod link;

pub use connection::{send_message, Connection};
pub use link::{DeviceLink, LinkState};
