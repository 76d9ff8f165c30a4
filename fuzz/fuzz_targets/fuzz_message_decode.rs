#![no_main]

//! Protocol message decoder fuzzer.
//!
//! Decoding must never panic, and anything accepted must encode back to the
//! exact line that was read.

use libfuzzer_sys::fuzz_target;
use wayfarer::protocol::{DealerMessage, PlayerMessage};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let bare = line.strip_suffix('\n').unwrap_or(line);

    if let Ok(message) = DealerMessage::decode(line) {
        assert_eq!(message.encode().trim_end_matches('\n'), bare);
    }
    if let Ok(message) = PlayerMessage::decode(line) {
        assert_eq!(message.encode().trim_end_matches('\n'), bare);
    }
});
