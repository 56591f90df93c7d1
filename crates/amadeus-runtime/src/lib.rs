//! Amadeus Runtime - orchestration layer for the Amadeus response bot.
//!
//! This crate provides:
//! - Layered configuration (`AmadeusConfig`, `ConfigLoader`)
//! - Logging setup (`LoggingBuilder`)
//! - Response state persistence (`StateStore`, `JsonStateStore`)
//! - The administrative service (`Admin`)
//! - User commands (`Commands`, `rate`, `Conversion`, ...)
//! - The event loop (`AmadeusRuntime`)
//!
//! ```ignore
//! use amadeus_runtime::{AmadeusRuntime, config::load_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let registry = Arc::new(my_registry()?);
//!     let runtime = AmadeusRuntime::from_config(&config, registry, my_bot())?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_adapter(tx);
//!
//!     // Run until Ctrl+C
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod runtime;

// Re-exports
pub use admin::{ALL, Admin, COMPLETION_LIMIT, outcome_message};
pub use commands::{
    ClickBoard, Commands, Conversion, pong, rate, rate_today, would_you_rather,
};
pub use config::{AmadeusConfig, ConfigLoader, load_config, load_config_from_file};
pub use error::{
    AdminError, AdminResult, CommandError, CommandResult, ConfigError, ConfigResult,
    PersistenceError, PersistenceResult, RuntimeError, RuntimeResult,
};
pub use logging::{LoggingBuilder, SpanEvents};
pub use persistence::{JsonStateStore, MemoryStateStore, SavedState, StateStore};
pub use runtime::{AmadeusRuntime, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
