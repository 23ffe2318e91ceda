#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for frame construction and decoding
//! Tests boundary conditions, malformed headers, short streams, and failing sinks

use peer_wire::config::{HEADER_LENGTH, MAX_MESSAGE_LENGTH};
use peer_wire::core::digest::checksum;
use peer_wire::utils::global_metrics;
use peer_wire::{Header, Message, Network, ProtocolError};
use std::io::{self, Cursor, Read, Write};

/// Hand-built frame with an arbitrary checksum.
fn raw_frame(magic: u32, command: &[u8], length: u32, sum: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = magic.to_be_bytes().to_vec();
    let mut field = [0u8; 12];
    field[..command.len()].copy_from_slice(command);
    bytes.extend_from_slice(&field);
    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(&sum);
    bytes.extend_from_slice(payload);
    bytes
}

/// Counts every byte handed out, so tests can see how far a decoder read.
struct CountingReader<R> {
    inner: R,
    consumed: usize,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n;
        Ok(n)
    }
}

/// Writes at most `chunk` bytes per call.
struct TrickleWriter {
    data: Vec<u8>,
    chunk: usize,
    calls: usize,
}

impl Write for TrickleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        let n = buf.len().min(self.chunk);
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Always refuses.
struct ClosedWriter;

impl Write for ClosedWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts nothing but reports success.
struct ZeroWriter;

impl Write for ZeroWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_command_length_boundary() {
    assert!(Message::new(Network::MainNet, "abcdefghijkl", vec![]).is_ok());
    assert!(matches!(
        Message::new(Network::MainNet, "abcdefghijklm", vec![]),
        Err(ProtocolError::InvalidCommand(_))
    ));
}

#[test]
fn test_thirteen_char_command_rejected() {
    let err = Message::new(Network::MainNet, "thirteenchars", b"payload".to_vec()).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidCommand(_)));
    assert!(!err.is_io());
}

#[test]
fn test_single_char_command() {
    let msg = Message::new(Network::TestNet, "x", vec![1]).unwrap();
    let decoded = Message::from_bytes(&msg.to_bytes(), Network::TestNet).unwrap();
    assert_eq!(decoded.command(), "x");
}

#[test]
fn test_header_fields_after_construction() {
    let payload = vec![0x5A; 1000];
    let msg = Message::new(Network::TestNet3, "getheaders", payload.clone()).unwrap();

    let header = msg.header();
    assert_eq!(header.network(), Network::TestNet3);
    assert_eq!(header.command(), "getheaders");
    assert_eq!(header.length(), 1000);
    assert_eq!(header.checksum(), checksum(&payload));
}

// ============================================================================
// HEADER DECODING
// ============================================================================

#[test]
fn test_header_encode_is_always_24_bytes() {
    for size in [0usize, 1, 24, 4096] {
        let msg = Message::new(Network::MainNet, "block", vec![0; size]).unwrap();
        assert_eq!(msg.header().encode().len(), HEADER_LENGTH);
    }
}

#[test]
fn test_header_decode_empty_input() {
    assert!(matches!(
        Header::decode(&[], Network::MainNet),
        Err(ProtocolError::InvalidHeaderLength(0))
    ));
}

#[test]
fn test_network_mismatch_with_valid_checksum() {
    let payload = b"hello";
    let bytes = raw_frame(
        Network::TestNet.magic(),
        b"ping",
        payload.len() as u32,
        checksum(payload),
        payload,
    );

    // Valid frame on its own network...
    assert!(Message::from_bytes(&bytes, Network::TestNet).is_ok());

    // ...rejected everywhere else.
    for network in [Network::MainNet, Network::TestNet3] {
        assert!(matches!(
            Message::from_bytes(&bytes, network),
            Err(ProtocolError::InvalidNetworkIdentifier { .. })
        ));
    }
}

#[test]
fn test_unknown_magic_rejected() {
    let bytes = raw_frame(0xDEADBEEF, b"ping", 0, checksum(b""), b"");
    match Message::from_bytes(&bytes, Network::MainNet) {
        Err(ProtocolError::InvalidNetworkIdentifier { expected, actual }) => {
            assert_eq!(expected, 0xD9B4BEF9);
            assert_eq!(actual, 0xDEADBEEF);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_empty_command_field_rejected() {
    let bytes = raw_frame(Network::MainNet.magic(), b"", 0, checksum(b""), b"");
    assert!(matches!(
        Message::from_bytes(&bytes, Network::MainNet),
        Err(ProtocolError::InvalidCommand(_))
    ));
}

#[test]
fn test_oversized_length_read_stops_at_header() {
    let bytes = raw_frame(
        Network::MainNet.magic(),
        b"block",
        (MAX_MESSAGE_LENGTH + 1) as u32,
        [0; 4],
        &[0xFF; 64],
    );
    let mut reader = CountingReader {
        inner: Cursor::new(bytes),
        consumed: 0,
    };

    assert!(matches!(
        Message::deserialize(&mut reader, Network::MainNet),
        Err(ProtocolError::InvalidMessageLength(1_000_000_001))
    ));
    assert_eq!(reader.consumed, HEADER_LENGTH);
}

#[test]
fn test_network_error_does_not_read_payload() {
    let bytes = raw_frame(Network::TestNet3.magic(), b"tx", 8, [0; 4], &[1; 8]);
    let mut reader = CountingReader {
        inner: Cursor::new(bytes),
        consumed: 0,
    };

    assert!(Message::deserialize(&mut reader, Network::MainNet).is_err());
    assert_eq!(reader.consumed, HEADER_LENGTH);
}

#[test]
fn test_huge_declared_length_with_short_stream() {
    // Declared length is under the cap but the peer hangs up early.
    let bytes = raw_frame(Network::MainNet.magic(), b"block", 500_000_000, [0; 4], &[7; 10]);

    match Message::from_bytes(&bytes, Network::MainNet) {
        Err(ProtocolError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("unexpected: {other:?}"),
    }
}

// ============================================================================
// CHECKSUM
// ============================================================================

#[test]
fn test_zeroed_checksum_rejected() {
    let payload = b"hello";
    let bytes = raw_frame(Network::MainNet.magic(), b"ping", 5, [0; 4], payload);

    match Message::from_bytes(&bytes, Network::MainNet) {
        Err(ProtocolError::InvalidChecksum { expected, actual }) => {
            assert_eq!(expected, [0; 4]);
            assert_eq!(actual, [0x95, 0x95, 0xc9, 0xdf]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_every_bit_flip_detected() {
    let msg = Message::new(Network::MainNet, "inv", b"abcdefgh".to_vec()).unwrap();
    let clean = msg.to_bytes();

    for byte in HEADER_LENGTH..clean.len() {
        for bit in 0..8 {
            let mut bytes = clean.clone();
            bytes[byte] ^= 1 << bit;
            assert!(
                matches!(
                    Message::from_bytes(&bytes, Network::MainNet),
                    Err(ProtocolError::InvalidChecksum { .. })
                ),
                "flip of byte {byte} bit {bit} went unnoticed"
            );
        }
    }
}

#[test]
fn test_checksum_failure_is_counted() {
    let before = global_metrics().snapshot();

    let mut bytes = Message::new(Network::MainNet, "tx", vec![1, 2, 3]).unwrap().to_bytes();
    bytes[HEADER_LENGTH] ^= 0x80;
    assert!(Message::from_bytes(&bytes, Network::MainNet).is_err());

    // Counters are process-wide and other tests run in parallel, so only growth is checked.
    let after = global_metrics().snapshot();
    assert!(after.checksum_failures > before.checksum_failures);
}

// ============================================================================
// STREAMS
// ============================================================================

#[test]
fn test_back_to_back_frames() {
    let first = Message::new(Network::MainNet, "version", vec![1; 100]).unwrap();
    let second = Message::new(Network::MainNet, "verack", vec![]).unwrap();

    let mut wire = Vec::new();
    first.serialize(&mut wire).unwrap();
    second.serialize(&mut wire).unwrap();

    let mut cursor = Cursor::new(wire);
    assert_eq!(Message::deserialize(&mut cursor, Network::MainNet).unwrap(), first);
    assert_eq!(Message::deserialize(&mut cursor, Network::MainNet).unwrap(), second);

    match Message::deserialize(&mut cursor, Network::MainNet) {
        Err(ProtocolError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_partial_writes_are_completed() {
    let msg = Message::new(Network::MainNet, "ping", b"hello".to_vec()).unwrap();
    let mut sink = TrickleWriter {
        data: Vec::new(),
        chunk: 3,
        calls: 0,
    };

    assert_eq!(msg.serialize(&mut sink).unwrap(), 29);
    assert_eq!(sink.data, msg.to_bytes());
    assert!(sink.calls > 2);
}

#[test]
fn test_closed_sink_reports_zero_bytes() {
    let msg = Message::new(Network::MainNet, "ping", b"hello".to_vec()).unwrap();

    match msg.serialize(&mut ClosedWriter) {
        Err(ProtocolError::Write { written, source }) => {
            assert_eq!(written, 0);
            assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_zero_length_write_is_an_error() {
    let msg = Message::new(Network::MainNet, "ping", vec![]).unwrap();

    match msg.serialize(&mut ZeroWriter) {
        Err(ProtocolError::Write { written, source }) => {
            assert_eq!(written, 0);
            assert_eq!(source.kind(), io::ErrorKind::WriteZero);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_from_bytes_ignores_trailing_data() {
    let msg = Message::new(Network::MainNet, "pong", vec![4, 2]).unwrap();
    let mut bytes = msg.to_bytes();
    bytes.extend_from_slice(b"next frame");

    assert_eq!(Message::from_bytes(&bytes, Network::MainNet).unwrap(), msg);
}

#[test]
fn test_large_payload_roundtrip() {
    let payload: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let msg = Message::new(Network::MainNet, "block", payload).unwrap();

    let mut wire = Vec::with_capacity(msg.wire_len());
    assert_eq!(msg.serialize(&mut wire).unwrap(), msg.wire_len());
    let decoded = Message::deserialize(&mut wire.as_slice(), Network::MainNet).unwrap();
    assert_eq!(decoded.payload().len(), 4 * 1024 * 1024);
    assert_eq!(decoded, msg);
}
