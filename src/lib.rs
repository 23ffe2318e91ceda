//! # peer-wire
//!
//! Message framing for peer-to-peer binary protocols.
//!
//! Every message on the wire is a fixed 24-byte header followed by an opaque
//! payload:
//!
//! ```text
//! [Network(4)] [Command(12)] [Length(4)] [Checksum(4)] [Payload(Length)]
//! ```
//!
//! Integers are big-endian, the command is zero-padded ASCII, and the checksum
//! is the first four bytes of `SHA256(SHA256(payload))`.
//!
//! The crate builds, writes, reads, and validates such frames. It does not own
//! the transport, interpret payloads, or retry anything; every error is fatal
//! to the message it came from.
//!
//! ## Quick Start
//! ```rust
//! use peer_wire::{Message, Network};
//!
//! # fn main() -> peer_wire::Result<()> {
//! let network = Network::MainNet;
//! let msg = Message::new(network, "ping", b"hello".to_vec())?;
//!
//! let mut wire = Vec::new();
//! msg.serialize(&mut wire)?;
//!
//! let decoded = Message::deserialize(&mut wire.as_slice(), network)?;
//! assert_eq!(decoded.command(), "ping");
//! assert_eq!(decoded.payload(), b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//! - [`core`]: digest, network identifiers, header, message, tokio codec
//! - [`config`]: wire constants and startup configuration
//! - [`error`]: [`ProtocolError`]
//! - [`utils`]: logging setup and metrics

#![deny(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::WireConfig;
pub use crate::core::codec::MessageCodec;
pub use crate::core::header::Header;
pub use crate::core::message::Message;
pub use crate::core::network::Network;
pub use crate::error::{ProtocolError, Result};
