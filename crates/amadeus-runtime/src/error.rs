//! Runtime error types.

use std::path::PathBuf;

use thiserror::Error;

use amadeus_framework::{RegistryError, StateError};

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Parsing or extraction failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    ValidationError { message: String },

    /// Missing required field.
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },
}

impl ConfigError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Errors raised while loading or saving response state.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The state file could not be read or written.
    #[error("State file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file does not hold valid saved state.
    #[error("Corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot could not be encoded.
    #[error("Failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors surfaced by the administrative surface.
#[derive(Error, Debug)]
pub enum AdminError {
    /// The caller is not the configured owner.
    #[error("Only the bot owner can do that")]
    NotOwner,

    /// No response with this name.
    #[error("Cannot find response {0}")]
    NotFound(String),

    /// The response rejected the state.
    #[error(transparent)]
    InvalidState(#[from] StateError),

    /// The change was applied but could not be saved.
    #[error("Change applied but not saved: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<RegistryError> for AdminError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(name) => Self::NotFound(name),
            RegistryError::State(e) => Self::InvalidState(e),
        }
    }
}

/// Errors raised by the user commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Not one of `ctof` / `ftoc`.
    #[error("Unknown conversion \"{0}\", expected \"ctof\" or \"ftoc\"")]
    UnknownConversion(String),

    /// The click was counted but could not be saved.
    #[error("Click counted but not saved: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Response state could not be saved.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A shutdown signal handler could not be installed.
    #[error("Failed to listen for shutdown signals: {0}")]
    Signal(#[source] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Result type for administrative operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Result type for user commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
