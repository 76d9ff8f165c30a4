//! End-to-end games across process boundaries.
//!
//! These tests start the real binary, both as player processes behind a
//! [`ProcessSeat`] and as the full `dealer` command, and check scores,
//! output and exit codes.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]

use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Output};
use std::time::Duration;

use tempfile::NamedTempFile;
use wayfarer::tournament::run_game;
use wayfarer::{Dealer, GameState, ItemDeck, PathDeck, ProcessSeat, StrategyKind, TieBreak};

const BIN: &str = env!("CARGO_BIN_EXE_wayfarer");
const TIMEOUT: Option<Duration> = Some(Duration::from_secs(10));

fn deck_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{contents}").unwrap();
    file
}

fn wayfarer(args: &[&OsStr]) -> Output {
    Command::new(BIN)
        .args(args)
        .env_remove("WAYFARER_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn process_game(path: &str, strategies: &[StrategyKind]) -> Vec<u32> {
    let seats = strategies
        .iter()
        .enumerate()
        .map(|(id, strategy)| {
            let leading = vec![
                "player".to_owned(),
                "--strategy".to_owned(),
                strategy.name().to_owned(),
            ];
            ProcessSeat::spawn(
                OsStr::new(BIN),
                &leading,
                strategies.len(),
                id as u8,
                TIMEOUT,
                true,
            )
            .unwrap()
        })
        .collect();
    let state = GameState::new(
        PathDeck::parse(path).unwrap(),
        ItemDeck::parse("5ABCDE").unwrap(),
        strategies.len(),
        TieBreak::Arrival,
    );
    Dealer::new(state, seats).run(|_| {}).unwrap()
}

#[test]
fn test_process_players_trace_game() {
    let scores = process_game("4;::-Mo1Do1::-", &[StrategyKind::Collector; 2]);
    assert_eq!(scores, vec![0, 3]);
}

#[test]
fn test_process_and_local_games_agree() {
    let path = "9;::-Mo2Do1V12::-Ri2V21Do2::-";
    let lineup = [StrategyKind::Donor, StrategyKind::Collector, StrategyKind::Donor];

    let over_pipes = process_game(path, &lineup);
    let in_process = run_game(
        &PathDeck::parse(path).unwrap(),
        &ItemDeck::parse("5ABCDE").unwrap(),
        &lineup,
        TieBreak::Arrival,
    )
    .unwrap();

    assert_eq!(over_pipes, in_process.scores);
}

#[test]
fn test_dealer_command_prints_progress_and_scores() {
    let items = deck_file("5ABCDE");
    let path = deck_file("4;::-Mo1Do1::-");

    let output = wayfarer(&[
        OsStr::new("dealer"),
        items.path().as_os_str(),
        path.path().as_os_str(),
        OsStr::new("builtin:collector"),
        OsStr::new("builtin:collector"),
    ]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(":: Mo Do ::"));
    assert!(stdout.contains("Player 1 Money=0 V1=0 V2=0 Points=3 A=0 B=0 C=0 D=0 E=0"));
    assert_eq!(stdout.lines().last(), Some("Scores: 0,3"));
}

#[test]
fn test_dealer_exit_codes() {
    let items = deck_file("5ABCDE");
    let path = deck_file("4;::-Mo1Do1::-");
    let bad = deck_file("4;::-Mo1Do1");

    // Bad item deck
    let output = wayfarer(&[
        OsStr::new("dealer"),
        bad.path().as_os_str(),
        path.path().as_os_str(),
        OsStr::new("builtin:donor"),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(String::from_utf8_lossy(&output.stderr).trim_end(), "Error reading deck");

    // Bad path deck
    let output = wayfarer(&[
        OsStr::new("dealer"),
        items.path().as_os_str(),
        bad.path().as_os_str(),
        OsStr::new("builtin:donor"),
    ]);
    assert_eq!(output.status.code(), Some(3));

    // Player program that does not exist
    let output = wayfarer(&[
        OsStr::new("dealer"),
        items.path().as_os_str(),
        path.path().as_os_str(),
        OsStr::new("/nonexistent/player"),
    ]);
    assert_eq!(output.status.code(), Some(4));

    // No players at all
    let output = wayfarer(&[
        OsStr::new("dealer"),
        items.path().as_os_str(),
        path.path().as_os_str(),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_player_argument_exit_codes() {
    let output = wayfarer(&[OsStr::new("player"), OsStr::new("0"), OsStr::new("0")]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(String::from_utf8_lossy(&output.stderr).trim_end(), "Invalid player count");

    let output = wayfarer(&[OsStr::new("player"), OsStr::new("2"), OsStr::new("2")]);
    assert_eq!(output.status.code(), Some(3));

    let output = wayfarer(&[OsStr::new("player"), OsStr::new("2")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_run_and_replay_commands() {
    let items = deck_file("5ABCDE");
    let path = deck_file("9;::-Mo2Do1V12::-Ri2V21Do2::-");
    let recording = NamedTempFile::new().unwrap();

    let output = wayfarer(&[
        OsStr::new("run"),
        path.path().as_os_str(),
        items.path().as_os_str(),
        OsStr::new("donor"),
        OsStr::new("collector"),
        OsStr::new("--save"),
        recording.path().as_os_str(),
    ]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Game Result"));

    let output = wayfarer(&[OsStr::new("replay"), recording.path().as_os_str()]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().last().unwrap().starts_with("Scores: "));
}
