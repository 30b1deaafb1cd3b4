//! Error types for drcom-rs

use std::net::SocketAddr;
use thiserror::Error;

/// Result type alias for drcom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for drcom-rs
///
/// Protocol rejections carry the discriminant byte the gateway answered with,
/// so recoveries can log it next to the raw datagram.
#[derive(Error, Debug)]
pub enum Error {
    /// No reply arrived within the receive window
    #[error("Timed out waiting for a reply from the gateway")]
    TransportTimeout,

    /// Challenge reply did not start with 0x02
    #[error("Challenge rejected by gateway (code 0x{code:02x})")]
    ChallengeRejected { code: u8 },

    /// Login reply did not start with 0x04
    #[error("Login rejected by gateway (code 0x{code:02x})")]
    LoginRejected { code: u8 },

    /// A keepalive reply did not start with 0x07
    #[error("Keepalive {phase} rejected by gateway (code 0x{code:02x})")]
    KeepAliveRejected { phase: &'static str, code: u8 },

    /// No local port in the probed range could be bound
    #[error("No bindable local port in range {start}-{end}")]
    PortExhaustion { start: u16, end: u16 },

    /// A datagram arrived from an address other than the gateway
    #[error("Datagram from unexpected peer {from}")]
    ProtocolDesync { from: SocketAddr },

    /// Operator requested shutdown
    #[error("Operation cancelled")]
    Cancelled,

    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed address
    #[error("Invalid address '{value}': {reason}")]
    InvalidAddress { value: String, reason: String },

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// Capture file analysis error
    #[error("Capture analysis error: {0}")]
    Capture(String),

    /// Named network interface does not exist
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),
}

impl Error {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address<S: Into<String>>(value: S, reason: S) -> Self {
        Error::InvalidAddress {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a keepalive rejection for the given phase
    pub fn keepalive_rejected(phase: &'static str, code: u8) -> Self {
        Error::KeepAliveRejected { phase, code }
    }

    /// Errors the state machine recovers from without operator involvement
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::TransportTimeout
                | Error::ChallengeRejected { .. }
                | Error::LoginRejected { .. }
                | Error::KeepAliveRejected { .. }
                | Error::ProtocolDesync { .. }
        )
    }
}
