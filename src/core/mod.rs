//! # Core Protocol Components
//!
//! Frame construction, encoding/decoding, and validation.
//!
//! ## Components
//! - **Digest**: Double SHA-256 payload checksums
//! - **Network**: Recognized network identifiers
//! - **Header**: Fixed 24-byte frame header
//! - **Message**: Header plus payload, blocking and async stream I/O
//! - **Codec**: Tokio codec for framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Network(4)] [Command(12)] [Length(4)] [Checksum(4)] [Payload(N)]
//! ```
//!
//! ## Security
//! - Maximum payload size: 1,000,000,000 bytes, checked before allocation
//! - Network identifier rejects frames from other deployments
//! - Checksum verified after every payload read

pub mod codec;
pub mod digest;
pub mod header;
pub mod message;
pub mod network;
