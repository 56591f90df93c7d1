//! Configuration for the Amadeus runtime.
//!
//! Settings are layered from defaults, files and `AMADEUS_*` environment
//! variables (see [`loader`]) and checked with [`validate_config`].

pub mod loader;
pub mod schema;
pub mod validation;

pub use crate::error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    AmadeusConfig, BotConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
    StateConfig,
};
pub use validation::validate_config;
