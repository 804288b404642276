//! Error types for holder detection

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while finding the holder
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// Port opened but nothing answered the challenge in time
    #[error("no handshake response on {port}")]
    HandshakeTimeout { port: String },

    /// Port answered the challenge with something other than the ack
    #[error("unrecognized handshake response on {port}: {response:?}")]
    HandshakeMismatch { port: String, response: String },

    /// I/O failure during the handshake
    #[error("I/O error on {port}: {source}")]
    Link {
        port: String,
        #[source]
        source: LinkError,
    },
}

/// Errors on an open link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Operation did not finish within its timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The device side went away
    #[error("connection closed by device")]
    Closed,

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    /// Whether this is a benign timeout rather than a lost link
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkError::Timeout(_))
    }
}
