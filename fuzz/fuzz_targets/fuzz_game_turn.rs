#![no_main]

//! Full game fuzzer.
//!
//! Drives a game with arbitrary proposed moves:
//! 1. Build a path from fuzzer-chosen sites
//! 2. Offer each proposed target to the rules; illegal ones must be rejected
//!    without changing the state
//! 3. Check invariants after every accepted move
//! 4. Replay the event log into a player mirror and compare views
//!
//! This catches disagreements between the dealer's rules and the player's
//! fold over broadcasts.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wayfarer::game::{check_invariants, compare_views};
use wayfarer::{GameState, ItemDeck, Mirror, PathDeck, Site, SiteKind, TieBreak};

/// A fuzzer-generated interior site.
#[derive(Arbitrary, Debug, Clone, Copy)]
struct FuzzSite {
    kind: u8,
    capacity: u8,
}

/// Structured input for whole-game fuzzing.
#[derive(Arbitrary, Debug)]
struct GameInput {
    sites: Vec<FuzzSite>,
    players: u8,
    tie_break: u8,
    targets: Vec<u8>,
}

fuzz_target!(|input: GameInput| {
    let mut sites = vec![Site::barrier()];
    for site in input.sites.iter().take(40) {
        let kind = SiteKind::ALL[usize::from(site.kind) % SiteKind::ALL.len()];
        sites.push(Site::new(kind, site.capacity % 9 + 1));
    }
    sites.push(Site::barrier());
    let Ok(path) = PathDeck::from_sites(sites) else {
        return;
    };

    let players = usize::from(input.players % 10) + 1;
    let tie_break = match input.tie_break % 3 {
        0 => TieBreak::Arrival,
        1 => TieBreak::Stack,
        _ => TieBreak::LowestId,
    };
    let items = ItemDeck::parse("5ABCDE").expect("fixed deck parses");
    let mut state = GameState::new(path.clone(), items, players, tie_break);

    for &target in &input.targets {
        let Some(player) = state.next_player() else {
            break;
        };
        let before = state.board().positions().to_vec();
        if state.apply_move(player, usize::from(target)).is_err() {
            assert_eq!(state.board().positions(), before.as_slice());
            continue;
        }
        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "{violations:?}");
    }

    let mirror = Mirror::replay(path, players, state.events()).expect("dealer log replays");
    let diff = compare_views(&state, mirror.board().positions(), mirror.records());
    assert!(diff.is_empty(), "{diff:?}");
});
