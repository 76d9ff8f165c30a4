//! Runtime configuration.
//!
//! Settings come from a TOML file, then environment variables override
//! individual keys. The file is searched for in this order:
//!
//! 1. An explicit path (the `--config` flag)
//! 2. The path in `WAYFARER_CONFIG`
//! 3. `wayfarer.toml` in the working directory
//!
//! With no file at all, [`GameConfig::default`] is used.
//!
//! ```toml
//! tie_break = "stack"        # stack | arrival | lowest-id
//! turn_timeout_ms = 5000     # 0 waits forever
//! log_level = "info"
//! quiet_players = true       # discard player stderr
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::game::TieBreak;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "WAYFARER_CONFIG";

/// Config file looked for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wayfarer.toml";

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// The file.
        path: PathBuf,
        /// The read error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`GameConfig`].
    #[error("cannot parse config {path}: {source}")]
    Parse {
        /// The file.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: toml::de::Error,
    },
    /// An override variable holds an unusable value.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Override {
        /// The variable name.
        key: &'static str,
        /// Its value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Game settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Turn order among participants sharing the rearmost site.
    pub tie_break: TieBreak,
    /// How long the dealer waits for each reply; 0 waits forever.
    pub turn_timeout_ms: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Discard the stderr of player processes.
    pub quiet_players: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::Arrival,
            turn_timeout_ms: 0,
            log_level: "warn".to_owned(),
            quiet_players: true,
        }
    }
}

impl GameConfig {
    /// Per-turn timeout, if any.
    #[must_use]
    pub fn turn_timeout(&self) -> Option<Duration> {
        (self.turn_timeout_ms > 0).then(|| Duration::from_millis(self.turn_timeout_ms))
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load from the first config file found, then apply environment
    /// overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or
    /// parsed, or an override is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`GameConfig::load`] with a custom environment lookup.
    ///
    /// # Errors
    ///
    /// Same as [`GameConfig::load`].
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let candidate = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let config = match candidate {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml(&text, &path)?
            }
            None => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };

        config.with_overrides(env)
    }

    /// Apply `WAYFARER_TIE_BREAK`, `WAYFARER_TURN_TIMEOUT_MS` and
    /// `WAYFARER_LOG_LEVEL` from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Override`] for a value that does not parse.
    pub fn with_overrides(mut self, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(value) = env("WAYFARER_TIE_BREAK") {
            self.tie_break = value.parse().map_err(|reason| ConfigError::Override {
                key: "WAYFARER_TIE_BREAK",
                value: value.clone(),
                reason,
            })?;
        }
        if let Some(value) = env("WAYFARER_TURN_TIMEOUT_MS") {
            self.turn_timeout_ms = value.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Override {
                    key: "WAYFARER_TURN_TIMEOUT_MS",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = env("WAYFARER_LOG_LEVEL") {
            self.log_level = value;
        }
        Ok(self)
    }
}
