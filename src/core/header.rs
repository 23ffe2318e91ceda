//! # Message Header
//!
//! Fixed 24-byte frame header.
//!
//! ## Wire Format
//! ```text
//! [Network(4)] [Command(12)] [Length(4)] [Checksum(4)]
//! ```
//! All integers are big-endian. The command is ASCII, right-padded with zero
//! bytes.
//!
//! ## Validation
//! [`Header::decode`] checks, in order: blob size, network identifier,
//! command field, declared length. Nothing past the header is touched, so an
//! oversized length is rejected before any payload allocation.

use crate::config::{CHECKSUM_LENGTH, COMMAND_LENGTH, HEADER_LENGTH, MAX_MESSAGE_LENGTH};
use crate::core::network::Network;
use crate::error::{constants, ProtocolError, Result};

/// Decoded, validated frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    network: Network,
    command: String,
    length: u32,
    checksum: [u8; CHECKSUM_LENGTH],
}

impl Header {
    /// Assemble a header from already-validated parts.
    pub(crate) fn from_parts(
        network: Network,
        command: String,
        length: u32,
        checksum: [u8; CHECKSUM_LENGTH],
    ) -> Self {
        Self {
            network,
            command,
            length,
            checksum,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Declared payload length.
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        self.checksum
    }

    /// Encode into the fixed 24-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_LENGTH] {
        let mut bytes = [0u8; HEADER_LENGTH];
        bytes[0..4].copy_from_slice(&self.network.magic().to_be_bytes());

        let name = self.command.as_bytes();
        let n = name.len().min(COMMAND_LENGTH);
        bytes[4..4 + n].copy_from_slice(&name[..n]);

        bytes[16..20].copy_from_slice(&self.length.to_be_bytes());
        bytes[20..24].copy_from_slice(&self.checksum);
        bytes
    }

    /// Decode and validate a header against the active network.
    pub fn decode(bytes: &[u8], network: Network) -> Result<Self> {
        let bytes: &[u8; HEADER_LENGTH] = bytes
            .try_into()
            .map_err(|_| ProtocolError::InvalidHeaderLength(bytes.len()))?;

        let magic = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        network.check(magic)?;

        let command = decode_command(&bytes[4..16])?;
        let length = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let checksum = [bytes[20], bytes[21], bytes[22], bytes[23]];

        if length as usize > MAX_MESSAGE_LENGTH {
            return Err(ProtocolError::InvalidMessageLength(length));
        }

        Ok(Self {
            network,
            command,
            length,
            checksum,
        })
    }
}

/// Validate a command name for construction.
///
/// Names must be 1..=12 ASCII bytes with no zero byte; anything else could not
/// be recovered unchanged from the padded field.
pub(crate) fn validate_command(command: &str) -> Result<()> {
    let reason = if command.len() > COMMAND_LENGTH {
        constants::ERR_COMMAND_TOO_LONG
    } else if command.is_empty() {
        constants::ERR_COMMAND_EMPTY
    } else if !command.is_ascii() {
        constants::ERR_COMMAND_NOT_ASCII
    } else if command.as_bytes().contains(&0) {
        constants::ERR_COMMAND_EMBEDDED_NUL
    } else {
        return Ok(());
    };
    Err(ProtocolError::InvalidCommand(format!("{command:?}: {reason}")))
}

/// Recover the command name from the 12-byte field.
///
/// The name ends at the first zero byte, or spans the whole field if there is
/// none. An empty name (zero in the first position) is rejected.
fn decode_command(field: &[u8]) -> Result<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let name = &field[..end];

    if name.is_empty() {
        return Err(ProtocolError::InvalidCommand(
            constants::ERR_COMMAND_EMPTY.to_string(),
        ));
    }
    if !name.is_ascii() {
        return Err(ProtocolError::InvalidCommand(format!(
            "{:02x?}: {}",
            name,
            constants::ERR_COMMAND_NOT_ASCII
        )));
    }

    // ASCII is valid UTF-8.
    Ok(name.iter().map(|&b| b as char).collect())
}
