//! CLI command implementations for Wayfarer.

pub(crate) mod dealer;
pub(crate) mod player;
pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod tournament;
pub(crate) mod validate;

mod output;

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use wayfarer::{
    ConfigError, DealerError, ItemDeck, ItemDeckError, PathDeck, PathError, PlayerError,
    replay::ReplayError, tournament::TournamentError,
};

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type: a message for stderr and the process exit code.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
    code: u8,
}

impl CliError {
    /// Create a new CLI error with exit code 1.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self::with_code(message, 1)
    }

    /// Create a new CLI error with a specific exit code.
    pub(crate) fn with_code(message: impl Into<String>, code: u8) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Process exit code.
    pub(crate) fn code(&self) -> u8 {
        self.code
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<DealerError> for CliError {
    fn from(e: DealerError) -> Self {
        Self::with_code(e.to_string(), e.exit_code())
    }
}

impl From<PlayerError> for CliError {
    fn from(e: PlayerError) -> Self {
        Self::with_code(e.to_string(), e.exit_code())
    }
}

impl From<TournamentError> for CliError {
    fn from(e: TournamentError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self {
        Self::new(e.to_string())
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `level`.
pub(crate) fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second init (tests, re-entry) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Read and parse a path deck file.
pub(crate) fn load_path(file: &Path) -> Result<PathDeck, DealerError> {
    let text = fs::read_to_string(file)
        .map_err(|e| DealerError::Path(PathError::Unreadable(format!("{}: {e}", file.display()))))?;
    PathDeck::parse(&text).map_err(DealerError::Path)
}

/// Read and parse an item deck file.
pub(crate) fn load_items(file: &Path) -> Result<ItemDeck, DealerError> {
    let text = fs::read_to_string(file).map_err(|e| {
        DealerError::ItemDeck(ItemDeckError::Unreadable(format!("{}: {e}", file.display())))
    })?;
    ItemDeck::parse(&text).map_err(DealerError::ItemDeck)
}
