//! # Error Types
//!
//! Error handling for the wire codec.
//!
//! Every variant is fatal to the message operation that produced it. The codec
//! never retries and never tries to resynchronize a stream after a framing
//! error; the caller decides whether to drop the connection.
//!
//! ## Error Categories
//! - **Framing Errors**: bad command names, wrong header size, foreign network,
//!   oversized lengths, checksum mismatches
//! - **I/O Errors**: failures of the underlying byte stream (short reads included)
//! - **Configuration Errors**: unknown network names, invalid config files
//!
//! ## Example Usage
//! ```rust
//! use peer_wire::core::message::Message;
//! use peer_wire::core::network::Network;
//! use peer_wire::error::ProtocolError;
//! use tracing::error;
//!
//! match Message::new(Network::MainNet, "thirteenchars", Vec::new()) {
//!     Err(ProtocolError::InvalidCommand(name)) => error!(%name, "Rejected command"),
//!     Err(e) => error!(error = %e, "Unexpected failure"),
//!     Ok(_) => unreachable!(),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Command name validation
    pub const ERR_COMMAND_TOO_LONG: &str = "command name exceeds 12 bytes";
    pub const ERR_COMMAND_EMPTY: &str = "command name is empty";
    pub const ERR_COMMAND_NOT_ASCII: &str = "command name is not ASCII";
    pub const ERR_COMMAND_EMBEDDED_NUL: &str = "command name contains a zero byte";

    /// Configuration errors
    pub const ERR_GLOBAL_SUBSCRIBER: &str = "A global tracing subscriber is already installed";
}

/// ProtocolError is the error type for every codec and configuration operation.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid header length: expected 24 bytes, got {0}")]
    InvalidHeaderLength(usize),

    #[error("Invalid network identifier: expected {expected:#010x}, got {actual:#010x}")]
    InvalidNetworkIdentifier { expected: u32, actual: u32 },

    #[error("Invalid payload length: {0} bytes exceeds the maximum message length")]
    InvalidPayloadLength(usize),

    #[error("Invalid message length: header declares {0} bytes")]
    InvalidMessageLength(u32),

    #[error("Invalid checksum: header carries {expected:02x?}, payload hashes to {actual:02x?}")]
    InvalidChecksum { expected: [u8; 4], actual: [u8; 4] },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("I/O error after {written} bytes written: {source}")]
    Write {
        written: usize,
        #[source]
        source: io::Error,
    },

    #[error("Unknown network identifier: {0:#010x}")]
    UnknownNetwork(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Whether this error came from the underlying stream rather than from the
    /// bytes it carried.
    pub fn is_io(&self) -> bool {
        matches!(self, ProtocolError::Io(_) | ProtocolError::Write { .. })
    }

    /// Bytes written before a write-path failure, if this is one.
    pub fn bytes_written(&self) -> Option<usize> {
        match self {
            ProtocolError::Write { written, .. } => Some(*written),
            _ => None,
        }
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
