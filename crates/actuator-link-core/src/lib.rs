//! Core library for WebActuatorControl device links.
//!
//! A device serves JSON messages over WebSocket at `ws://<host>/ws`. This
//! crate decodes its telemetry and serial output into a [`panel::StatusPanel`]
//! and sends button presses and settings back, reconnecting whenever the
//! socket closes.

pub mod config;
pub mod device;
pub mod error;
pub mod panel;
pub mod protocol;

pub use config::LinkConfig;
pub use device::{DeviceLink, LinkState};
pub use error::{CoreError, Result};
pub use panel::{LinkView, PanelField, StatusPanel};
