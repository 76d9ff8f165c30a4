//! Dealer command implementation: a game against player processes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;
use wayfarer::dealer::Progress;
use wayfarer::protocol::score_line;
use wayfarer::{Dealer, DealerError, GameConfig, GameState, PlayerId, ProcessSeat, StrategyKind};

use super::{CliError, load_items, load_path};

/// Prefix selecting one of this binary's own strategies as a player.
const BUILTIN_PREFIX: &str = "builtin:";

/// How to start one player process.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlayerCommand {
    program: OsString,
    leading: Vec<String>,
}

impl PlayerCommand {
    /// `builtin:<strategy>` runs this executable's `player` subcommand;
    /// anything else is a program path.
    fn resolve(
        arg: &str,
        self_exe: impl FnOnce() -> std::io::Result<PathBuf>,
    ) -> Result<Self, CliError> {
        match arg.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => {
                let strategy: StrategyKind = name.parse().map_err(CliError::new)?;
                let exe = self_exe()
                    .map_err(|e| CliError::with_code(format!("Error starting process: {e}"), 4))?;
                Ok(Self {
                    program: exe.into_os_string(),
                    leading: vec![
                        "player".to_owned(),
                        "--strategy".to_owned(),
                        strategy.name().to_owned(),
                    ],
                })
            }
            None => Ok(Self {
                program: OsString::from(arg),
                leading: Vec::new(),
            }),
        }
    }
}

/// Execute the dealer command.
///
/// Prints the board at the start, the mover's status line and the board
/// after every move, then the final score line, all to stdout.
///
/// # Errors
///
/// Returns an error carrying the dealer's exit code.
pub(crate) fn execute(
    items: &Path,
    path: &Path,
    players: &[String],
    config: &GameConfig,
) -> Result<(), CliError> {
    let items = load_items(items)?;
    let path = load_path(path)?;
    let commands = players
        .iter()
        .map(|arg| PlayerCommand::resolve(arg, std::env::current_exe))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seats = Vec::with_capacity(commands.len());
    for (id, command) in commands.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let id = id as PlayerId;
        let seat = ProcessSeat::spawn(
            &command.program,
            &command.leading,
            commands.len(),
            id,
            config.turn_timeout(),
            config.quiet_players,
        )
        .map_err(|e| {
            CliError::from(DealerError::Start {
                player: id,
                source: e.into(),
            })
        })?;
        seats.push(seat);
    }
    info!(players = seats.len(), "all players started");

    let state = GameState::new(path, items, seats.len(), config.tie_break);
    let mut dealer = Dealer::new(state, seats);
    let scores = dealer.run(print_progress)?;
    println!("{}", score_line(&scores));
    Ok(())
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Started(state) => print!("{}", state.board().render()),
        Progress::Moved(state, event) => {
            if let Some(record) = state.record(event.player) {
                println!("{record}");
            }
            print!("{}", state.board().render());
        }
        Progress::Finished(_) => {}
    }
}
