//! # Message
//!
//! A validated frame: [`Header`] plus opaque payload.
//!
//! A `Message` only exists in a valid state. It is either built with
//! [`Message::new`], which derives the checksum from the payload, or read off a
//! stream with [`Message::deserialize`], which verifies the checksum after the
//! payload arrives. Fields are private and there are no setters; a different
//! payload means a new message.
//!
//! ## Read Path
//! ```text
//! AwaitHeader --24 bytes--> AwaitPayload --length bytes--> Verify --> Complete
//!      |                         |                           |
//!      +-------------------------+------------ error --------+--> Failed
//! ```
//! The header is validated before any payload byte is read, so a declared
//! length over the cap never causes an allocation. The payload buffer grows
//! with the bytes that actually arrive.
//!
//! ## Write Path
//! Header then payload, as two write sequences. A failure in either reports how
//! many bytes reached the sink through [`ProtocolError::Write`].

use crate::config::{HEADER_LENGTH, MAX_MESSAGE_LENGTH};
use crate::core::digest::checksum;
use crate::core::header::{validate_command, Header};
use crate::core::network::Network;
use crate::error::{ProtocolError, Result};
use crate::utils::metrics::global_metrics;
use std::io::{self, Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

/// Initial payload buffer size; the buffer grows past this only as bytes arrive.
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// A framed protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: Header,
    payload: Vec<u8>,
}

impl Message {
    /// Build a message for `network`, deriving length and checksum from `payload`.
    ///
    /// Fails with [`ProtocolError::InvalidCommand`] if the command is longer than
    /// 12 bytes (or empty, non-ASCII, or contains a zero byte) and with
    /// [`ProtocolError::InvalidPayloadLength`] if the payload exceeds 1,000,000,000
    /// bytes.
    pub fn new(network: Network, command: &str, payload: Vec<u8>) -> Result<Self> {
        validate_command(command)?;
        if payload.len() > MAX_MESSAGE_LENGTH {
            return Err(ProtocolError::InvalidPayloadLength(payload.len()));
        }

        let header = Header::from_parts(
            network,
            command.to_owned(),
            payload.len() as u32,
            checksum(&payload),
        );
        Ok(Self { header, payload })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn network(&self) -> Network {
        self.header.network()
    }

    pub fn command(&self) -> &str {
        self.header.command()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Hand the `(command, payload)` pair to a dispatcher.
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.header.command().to_owned(), self.payload)
    }

    /// Total encoded size: header plus payload.
    pub fn wire_len(&self) -> usize {
        HEADER_LENGTH + self.payload.len()
    }

    /// Encode the full frame into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&self.header.encode());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Decode one frame from the front of `bytes`. Bytes past the frame are ignored.
    pub fn from_bytes(bytes: &[u8], network: Network) -> Result<Self> {
        let mut cursor = bytes;
        Self::deserialize(&mut cursor, network)
    }

    /// Write header and payload to `sink`, returning the number of bytes written.
    #[instrument(level = "trace", skip_all, fields(command = %self.command(), len = self.payload.len()))]
    pub fn serialize<W: Write>(&self, sink: &mut W) -> Result<usize> {
        let mut written = 0;
        let outcome = write_counted(sink, &self.header.encode(), &mut written)
            .and_then(|()| write_counted(sink, &self.payload, &mut written));

        self.finish_write(outcome, written)
    }

    /// Async counterpart of [`Message::serialize`].
    #[instrument(level = "trace", skip_all, fields(command = %self.command(), len = self.payload.len()))]
    pub async fn serialize_async<W: AsyncWrite + Unpin>(&self, sink: &mut W) -> Result<usize> {
        let mut written = 0;
        let mut outcome = write_counted_async(sink, &self.header.encode(), &mut written).await;
        if outcome.is_ok() {
            outcome = write_counted_async(sink, &self.payload, &mut written).await;
        }

        self.finish_write(outcome, written)
    }

    /// Read and validate one frame from `source`.
    ///
    /// Short reads surface as [`ProtocolError::Io`] with `UnexpectedEof`.
    #[instrument(level = "trace", skip(source))]
    pub fn deserialize<R: Read>(source: &mut R, network: Network) -> Result<Self> {
        let outcome = read_frame(source, network);
        record_read(&outcome);
        outcome
    }

    /// Async counterpart of [`Message::deserialize`].
    #[instrument(level = "trace", skip(source))]
    pub async fn deserialize_async<R: AsyncRead + Unpin>(
        source: &mut R,
        network: Network,
    ) -> Result<Self> {
        let outcome = read_frame_async(source, network).await;
        record_read(&outcome);
        outcome
    }

    /// Final read-path step: the payload must hash to the header checksum.
    pub(crate) fn verify(header: Header, payload: Vec<u8>) -> Result<Self> {
        debug_assert_eq!(header.length() as usize, payload.len());

        let actual = checksum(&payload);
        if actual != header.checksum() {
            warn!(
                command = header.command(),
                expected = ?header.checksum(),
                actual = ?actual,
                "Payload checksum mismatch"
            );
            return Err(ProtocolError::InvalidChecksum {
                expected: header.checksum(),
                actual,
            });
        }

        debug!(command = header.command(), bytes = payload.len(), "Message received");
        Ok(Self { header, payload })
    }

    fn finish_write(&self, outcome: io::Result<()>, written: usize) -> Result<usize> {
        match outcome {
            Ok(()) => {
                global_metrics().message_sent(written as u64);
                debug!(command = self.command(), bytes = written, "Message sent");
                Ok(written)
            }
            Err(source) => {
                global_metrics().io_error();
                warn!(command = self.command(), written, error = %source, "Message write failed");
                Err(ProtocolError::Write { written, source })
            }
        }
    }
}

fn read_frame<R: Read>(source: &mut R, network: Network) -> Result<Message> {
    let mut head = [0u8; HEADER_LENGTH];
    source.read_exact(&mut head)?;
    let header = Header::decode(&head, network)?;

    let expected = header.length() as usize;
    let mut payload = Vec::with_capacity(expected.min(INITIAL_PAYLOAD_CAPACITY));
    source.by_ref().take(expected as u64).read_to_end(&mut payload)?;
    ensure_complete(&payload, expected)?;

    Message::verify(header, payload)
}

async fn read_frame_async<R: AsyncRead + Unpin>(
    source: &mut R,
    network: Network,
) -> Result<Message> {
    let mut head = [0u8; HEADER_LENGTH];
    source.read_exact(&mut head).await?;
    let header = Header::decode(&head, network)?;

    let expected = header.length() as usize;
    let mut payload = Vec::with_capacity(expected.min(INITIAL_PAYLOAD_CAPACITY));
    (&mut *source)
        .take(expected as u64)
        .read_to_end(&mut payload)
        .await?;
    ensure_complete(&payload, expected)?;

    Message::verify(header, payload)
}

fn ensure_complete(payload: &[u8], expected: usize) -> io::Result<()> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "stream ended after {} of {expected} payload bytes",
                payload.len()
            ),
        ))
    }
}

fn record_read(outcome: &Result<Message>) {
    let metrics = global_metrics();
    match outcome {
        Ok(msg) => metrics.message_received(msg.wire_len() as u64),
        Err(e) => metrics.read_failed(e),
    }
}

/// Like `write_all`, but keeps count of bytes accepted by the sink.
fn write_counted<W: Write>(sink: &mut W, mut buf: &[u8], written: &mut usize) -> io::Result<()> {
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => {
                *written += n;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

async fn write_counted_async<W: AsyncWrite + Unpin>(
    sink: &mut W,
    mut buf: &[u8],
    written: &mut usize,
) -> io::Result<()> {
    while !buf.is_empty() {
        match sink.write(buf).await {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => {
                *written += n;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
