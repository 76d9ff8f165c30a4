//! Benchmarks for running complete games.
//!
//! Covers the in-process game loop, which is the hot path of tournaments,
//! plus the path parser and the player's decision ladder on their own.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use wayfarer::strategy::View;
use wayfarer::tournament::{run_game, run_tournament};
use wayfarer::{ItemDeck, Mirror, PathDeck, StrategyKind, TieBreak};

const LONG_PATH: &str = "24;::-Mo2Do1V12Ri3::-V21Mo1Do2Ri1V13::-Mo3V22Do1Ri2::-V11Mo2Do3Ri1V21Mo1::-";

fn decks() -> (PathDeck, ItemDeck) {
    (
        PathDeck::parse(LONG_PATH).unwrap(),
        ItemDeck::parse("10ABCDEEDCBA").unwrap(),
    )
}

fn bench_single_game(c: &mut Criterion) {
    let (path, items) = decks();
    let lineup = [StrategyKind::Donor, StrategyKind::Collector];

    c.bench_function("single_game_2p", |b| {
        b.iter(|| {
            let result = run_game(black_box(&path), black_box(&items), &lineup, TieBreak::Arrival);
            black_box(result)
        });
    });
}

fn bench_single_game_6p(c: &mut Criterion) {
    let (path, items) = decks();
    let lineup = [
        StrategyKind::Donor,
        StrategyKind::Collector,
        StrategyKind::Donor,
        StrategyKind::Collector,
        StrategyKind::Donor,
        StrategyKind::Collector,
    ];

    c.bench_function("single_game_6p", |b| {
        b.iter(|| {
            let result = run_game(black_box(&path), black_box(&items), &lineup, TieBreak::Stack);
            black_box(result)
        });
    });
}

fn bench_tournament(c: &mut Criterion) {
    let (path, items) = decks();
    let lineup = [StrategyKind::Donor; 10];

    c.bench_function("tournament_10_rotations", |b| {
        b.iter(|| {
            let summary = run_tournament(&path, &items, black_box(&lineup), TieBreak::Arrival, || {});
            black_box(summary)
        });
    });
}

fn bench_path_parse(c: &mut Criterion) {
    c.bench_function("path_parse", |b| {
        b.iter(|| black_box(PathDeck::parse(black_box(LONG_PATH))));
    });
}

fn bench_decide(c: &mut Criterion) {
    let (path, _) = decks();
    let mirror = Mirror::new(path, 4);
    let view = View::new(&mirror, 0).unwrap();
    let donor = StrategyKind::Donor.ladder();
    let collector = StrategyKind::Collector.ladder();

    c.bench_function("decide_donor", |b| {
        b.iter(|| black_box(donor.decide(black_box(&view))));
    });
    c.bench_function("decide_collector", |b| {
        b.iter(|| black_box(collector.decide(black_box(&view))));
    });
}

criterion_group!(
    benches,
    bench_single_game,
    bench_single_game_6p,
    bench_tournament,
    bench_path_parse,
    bench_decide
);
criterion_main!(benches);
