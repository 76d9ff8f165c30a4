//! Wayfarer CLI - dealer, player, and offline tools for the path game.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use wayfarer::{GameConfig, StrategyKind};

/// Wayfarer - a turn-based path game over a line protocol
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to load instead of the default search
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Deal a game to player processes
    Dealer {
        /// Item deck file
        items: PathBuf,

        /// Path deck file
        path: PathBuf,

        /// Player programs, or builtin:donor / builtin:collector (1-10)
        #[arg(required = true, num_args = 1..=10)]
        players: Vec<String>,
    },

    /// Play one seat over stdin/stdout
    Player {
        /// Number of players in the game
        pcount: String,

        /// This player's id
        id: String,

        /// Decision ladder to play
        #[arg(short, long, default_value = "donor")]
        strategy: StrategyKind,
    },

    /// Run a single in-process game
    Run {
        /// Path deck file
        path: PathBuf,

        /// Item deck file
        items: PathBuf,

        /// One strategy per seat (1-10)
        #[arg(required = true, num_args = 1..=10)]
        strategies: Vec<StrategyKind>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Play every seating rotation of a line-up and aggregate statistics
    Tournament {
        /// Path deck file
        path: PathBuf,

        /// Item deck file
        items: PathBuf,

        /// Line-up, one strategy per seat (1-10)
        #[arg(required = true, num_args = 1..=10)]
        strategies: Vec<StrategyKind>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Replay and verify a recorded game
    Replay {
        /// Recording file (.json)
        recording: PathBuf,

        /// Show only the board after this many moves
        #[arg(short, long)]
        turn: Option<usize>,

        /// Colored output
        #[arg(long)]
        color: bool,
    },

    /// Validate deck files
    Validate {
        /// Path deck file
        path: PathBuf,

        /// Item deck file to check as well
        #[arg(long)]
        items: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // Help and version exit cleanly; every usage error is exit 1
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match GameConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };
    cli::init_logging(&config.log_level);

    let result = match args.command {
        Commands::Dealer {
            items,
            path,
            players,
        } => cli::dealer::execute(&items, &path, &players, &config),

        Commands::Player {
            pcount,
            id,
            strategy,
        } => cli::player::execute(&pcount, &id, strategy),

        Commands::Run {
            path,
            items,
            strategies,
            format,
            save,
        } => cli::run::execute(&path, &items, &strategies, format, save.as_deref(), &config),

        Commands::Tournament {
            path,
            items,
            strategies,
            threads,
            format,
            progress,
        } => cli::tournament::execute(
            &path,
            &items,
            &strategies,
            threads,
            format,
            progress,
            &config,
        ),

        Commands::Replay {
            recording,
            turn,
            color,
        } => cli::replay::execute(&recording, turn, color),

        Commands::Validate { path, items } => cli::validate::execute(&path, items.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.code())
        }
    }
}
