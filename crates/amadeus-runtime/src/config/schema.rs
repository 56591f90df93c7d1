//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AmadeusConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Identity of the bot account.
    #[serde(default)]
    pub bot: BotConfig,

    /// Where response state is kept between runs.
    #[serde(default)]
    pub state: StateConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`. Rotated daily when
    /// `rotate_daily` is set.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotate_daily: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module levels, e.g. `amadeus_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            rotate_daily: false,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Bot
// =============================================================================

/// Identity of the bot account and its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// The bot's own user id. Messages from this id are never dispatched.
    #[serde(default = "default_bot_id")]
    pub id: u64,

    /// Display name, used as the fallback roleplay target.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// User allowed to run administrative commands. `None` allows everyone.
    #[serde(default)]
    pub owner_id: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            id: default_bot_id(),
            name: default_bot_name(),
            owner_id: None,
        }
    }
}

fn default_bot_id() -> u64 {
    587652588019908629
}

fn default_bot_name() -> String {
    "Amadeus".to_string()
}

// =============================================================================
// State
// =============================================================================

/// Response state persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// JSON file holding saved states and enabled flags.
    #[serde(default = "default_state_path")]
    pub path: PathBuf,

    /// Seed the registry from `path` on start.
    #[serde(default = "default_true")]
    pub restore_on_start: bool,

    /// Write `path` after every administrative change.
    #[serde(default = "default_true")]
    pub save_on_change: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            restore_on_start: true,
            save_on_change: true,
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data/state.json")
}

fn default_true() -> bool {
    true
}
