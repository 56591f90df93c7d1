//! Error types for platform calls.

use thiserror::Error;

/// Errors reported by a [`Bot`](crate::Bot) implementation.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The platform connection is not available.
    #[error("bot is not connected")]
    NotConnected,

    /// The call did not complete in time.
    #[error("API call timed out")]
    Timeout,

    /// The referenced channel, message or user does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// What was looked up (e.g. "channel").
        kind: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// The bot lacks permission for the operation.
    #[error("missing permission: {0}")]
    Forbidden(String),

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Any other platform failure.
    #[error("API error: {0}")]
    Other(String),
}

impl ApiError {
    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result type for platform calls.
pub type ApiResult<T> = Result<T, ApiError>;
