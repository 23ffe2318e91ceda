//! # Message Codec
//!
//! `tokio_util` framing for [`Message`]s over any async byte stream.
//!
//! The network is bound when the codec is created and never changes. The
//! header is decoded and validated as soon as its 24 bytes are buffered, so a
//! foreign network or an oversized length fails before the codec waits for (or
//! reserves room for) the payload.
//!
//! After an error the stream is out of sync; callers should drop it rather than
//! keep decoding.

use crate::config::{CodecConfig, DEFAULT_READ_BUFFER_CAPACITY, HEADER_LENGTH};
use crate::core::header::Header;
use crate::core::message::Message;
use crate::core::network::Network;
use crate::error::{ProtocolError, Result};
use crate::utils::metrics::global_metrics;
use bytes::{BufMut, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::trace;

#[derive(Debug)]
enum DecodeState {
    AwaitHeader,
    AwaitPayload(Header),
}

/// Frame codec bound to a single network.
#[derive(Debug)]
pub struct MessageCodec {
    network: Network,
    max_reserve: usize,
    state: DecodeState,
}

impl MessageCodec {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            max_reserve: DEFAULT_READ_BUFFER_CAPACITY,
            state: DecodeState::AwaitHeader,
        }
    }

    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            network: config.network,
            max_reserve: config.read_buffer_capacity.max(HEADER_LENGTH),
            state: DecodeState::AwaitHeader,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn decode_frame(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        let header = match std::mem::replace(&mut self.state, DecodeState::AwaitHeader) {
            DecodeState::AwaitHeader => {
                if src.len() < HEADER_LENGTH {
                    src.reserve(HEADER_LENGTH - src.len());
                    return Ok(None);
                }
                let head = src.split_to(HEADER_LENGTH);
                Header::decode(&head, self.network)?
            }
            DecodeState::AwaitPayload(header) => header,
        };

        let length = header.length() as usize;
        if src.len() < length {
            let missing = length - src.len();
            src.reserve(missing.min(self.max_reserve));
            trace!(command = header.command(), missing, "Awaiting payload bytes");
            self.state = DecodeState::AwaitPayload(header);
            return Ok(None);
        }

        let payload = src.split_to(length);
        Message::verify(header, payload.to_vec()).map(Some)
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let outcome = self.decode_frame(src);
        match &outcome {
            Ok(Some(msg)) => global_metrics().message_received(msg.wire_len() as u64),
            Ok(None) => {}
            Err(e) => global_metrics().read_failed(e),
        }
        outcome
    }

    /// A stream that ends with a partial header or a pending payload is a
    /// short read, even when no buffered bytes are left.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(msg) = self.decode(src)? {
            return Ok(Some(msg));
        }
        if src.is_empty() && matches!(self.state, DecodeState::AwaitHeader) {
            return Ok(None);
        }

        let err = ProtocolError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream ended inside a frame",
        ));
        global_metrics().read_failed(&err);
        Err(err)
    }
}

/// Encoding only stages the frame in the write buffer. `messages_sent` counts
/// frames handed to the sink, so a later flush failure is not subtracted.
impl<'a> Encoder<&'a Message> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: &'a Message, dst: &mut BytesMut) -> Result<()> {
        self.network.check(msg.network().magic())?;

        dst.reserve(msg.wire_len());
        dst.put_slice(&msg.header().encode());
        dst.put_slice(msg.payload());

        global_metrics().message_sent(msg.wire_len() as u64);
        Ok(())
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        <Self as Encoder<&Message>>::encode(self, &msg, dst)
    }
}

/// Wrap a byte stream in a [`MessageCodec`] for `network`.
pub fn framed<T>(io: T, network: Network) -> Framed<T, MessageCodec>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(io, MessageCodec::new(network))
}
