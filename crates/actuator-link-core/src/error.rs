//! Error types for the actuator link core.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Socket-level errors.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("WebSocket connect to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("Connection timeout to {url}")]
    ConnectTimeout { url: String },

    #[error("WebSocket send error: {0}")]
    Send(String),

    #[error("Device link is not connected")]
    NotConnected,

    #[error("Device link is closed")]
    Closed,
}

/// Message encoding and decoding errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid host: {0}")]
    InvalidHost(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_error_display() {
        let err = LinkError::ConnectTimeout {
            url: "ws://192.168.4.1/ws".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Connection timeout to ws://192.168.4.1/ws"
        );
    }

    #[test]
    fn test_core_error_from_link_error() {
        let err = CoreError::from(LinkError::NotConnected);
        assert!(format!("{}", err).contains("not connected"));
    }

    #[test]
    fn test_core_error_from_protocol_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = CoreError::from(ProtocolError::Malformed(json_err));
        assert!(format!("{}", err).starts_with("Protocol error: Malformed message"));
    }

    #[test]
    fn test_config_error_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
