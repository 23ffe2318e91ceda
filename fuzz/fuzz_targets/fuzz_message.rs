#![no_main]

use libfuzzer_sys::fuzz_target;
use peer_wire::{Header, Message, Network};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics or huge allocations
    for network in Network::ALL {
        if let Ok(msg) = Message::from_bytes(data, network) {
            // Anything that decodes must survive its own round trip
            let again = Message::from_bytes(&msg.to_bytes(), network);
            assert_eq!(again.ok().as_ref(), Some(&msg));
        }
    }

    if data.len() >= 24 {
        let _ = Header::decode(&data[..24], Network::MainNet);
    }
});
