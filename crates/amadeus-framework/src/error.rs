//! Error types for the response engine.

use thiserror::Error;

/// Rejection of a state string passed to
/// [`Response::set_state`](crate::Response::set_state).
///
/// A rejected state never mutates the response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    /// The response has no configurable state.
    #[error("cannot set a state for response '{name}'")]
    Unsupported {
        /// Name of the response.
        name: String,
    },

    /// Not one of the reply modes.
    #[error("state can only be either \"message\" or \"react\", not \"{0}\"")]
    InvalidMode(String),

    /// Not parseable as a floating point number.
    #[error("{0} is not a valid state for this response, it has to be a floating point number")]
    NotANumber(String),

    /// A number outside `[0, 1]`.
    #[error("{0} is not a valid probability, it needs to be between 0 and 1 (inclusive)")]
    OutOfRange(f64),
}

/// Errors surfaced by direct registry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No response with this name.
    #[error("cannot find response {0}")]
    NotFound(String),

    /// The response rejected the state.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Errors raised while assembling triggers and actions.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A chance outside `[0, 1]` was given at construction.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Result type for state changes.
pub type StateResult<T> = Result<T, StateError>;

/// Result type for registry lookups and updates.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for building rules.
pub type BuildResult<T> = Result<T, BuildError>;
