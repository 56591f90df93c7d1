//! # Amadeus Framework
//!
//! The rule engine of the Amadeus bot.
//!
//! This layer provides:
//! - [`Trigger`]: composable predicates over a message, including channel
//!   history lookups and per-channel cooldowns
//! - [`Action`]: effects run against a matched message
//! - [`Response`]: a named trigger/action binding with an enabled flag and
//!   runtime-tunable state
//! - [`Registry`] and [`Dispatcher`]: ordered, first-match-wins dispatch
//!
//! Everything here is platform agnostic; effects go through the
//! [`Bot`](amadeus_core::Bot) trait.

pub mod action;
pub mod context;
pub mod cooldown;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod response;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use action::{Action, Candidate, NameFormatter, RandomTemplate, RegexSend, TextFn, bold};
pub use context::EventContext;
pub use cooldown::CooldownTracker;
pub use dispatcher::Dispatcher;
pub use error::{
    BuildError, BuildResult, RegistryError, RegistryResult, StateError, StateResult,
};
pub use registry::{BulkReport, Registry, ResponseSummary, SkippedEntry};
pub use response::{DEFAULT_CHANCE, NO_STATE, ReplyMode, Response, ResponseKind};
pub use trigger::{CheckFn, Literals, Trigger};
