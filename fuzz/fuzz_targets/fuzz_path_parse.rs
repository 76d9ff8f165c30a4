#![no_main]

//! Path and item deck parser fuzzer.
//!
//! Any input must either be rejected with an error or parse into a deck
//! whose canonical form parses back to the same deck.

use libfuzzer_sys::fuzz_target;
use wayfarer::{ItemDeck, PathDeck};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(deck) = PathDeck::parse(text) {
        let canonical = deck.to_string();
        let reparsed = PathDeck::parse(&canonical).expect("canonical path deck must parse");
        assert_eq!(reparsed, deck);
        assert!(deck.len() >= 2);
        assert!(deck.sites()[0].is_barrier());
        assert!(deck.sites()[deck.last_index()].is_barrier());
    }

    if let Ok(items) = ItemDeck::parse(text) {
        let reparsed = ItemDeck::parse(&items.to_string()).expect("canonical item deck must parse");
        assert_eq!(reparsed.len(), items.len());
    }
});
