#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use peer_wire::{MessageCodec, Network};
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Feed the stream decoder in small slices to exercise every partial state
    let mut codec = MessageCodec::new(Network::MainNet);
    let mut buf = BytesMut::new();

    for chunk in data.chunks(7) {
        buf.extend_from_slice(chunk);
        match codec.decode(&mut buf) {
            Ok(_) => {}
            Err(_) => return,
        }
    }
});
