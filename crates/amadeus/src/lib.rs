//! # Amadeus
//!
//! A chat bot that answers messages with configurable trigger/action
//! responses.
//!
//! ## Overview
//!
//! Every inbound message is offered to an ordered list of named responses.
//! The first enabled response whose trigger matches runs its action: a
//! fixed reply, a regex rewrite of the message, a random pick, an emoji
//! reaction or a roleplay message. Operators tune responses at run time
//! (reply mode, trigger chance, on/off) and the settings survive restarts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  MessageEvent  ┌─────────┐   ┌────────────┐   ┌──────────┐
//! │   Adapter   │───────────────▶│ Runtime │──▶│ Dispatcher │──▶│ Registry │
//! │ (impl Bot)  │◀──────────┐    └────┬────┘   └────────────┘   └────┬─────┘
//! └─────────────┘           │         │ admin commands               │
//!                           │         ▼                              │
//!                           │    ┌─────────┐   save   ┌────────────┐ │
//!                           │    │  Admin  │─────────▶│ StateStore │ │
//!                           │    └─────────┘          └────────────┘ │
//!                           └─────── send / react / history ◀────────┘
//! ```
//!
//! - **Core**: events, ids, rich messages and the [`Bot`](core::Bot) trait
//! - **Framework**: triggers, actions, responses, the registry and dispatcher
//! - **Runtime**: configuration, logging, persistence, admin and the event loop
//! - [`responses`]: the built-in response set
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use amadeus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let registry = Arc::new(default_registry(UserId(config.bot.id))?);
//!     let runtime = AmadeusRuntime::from_config(&config, registry, my_adapter())?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     spawn_event_source(tx);
//!
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub mod responses;

pub use amadeus_core as core;
pub use amadeus_framework as framework;
pub use amadeus_runtime as runtime;

pub use responses::default_registry;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use amadeus::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use amadeus_runtime::{
        Admin, AmadeusConfig, AmadeusRuntime, Commands, Conversion, load_config,
        load_config_from_file, outcome_message,
    };

    // Building responses
    pub use amadeus_framework::{
        Action, Candidate, Dispatcher, EventContext, Registry, ReplyMode, Response, Trigger,
    };

    // Platform side
    pub use amadeus_core::{
        Author, Bot, BoxedBot, ChannelId, EmojiId, MessageEvent, MessageId, RichMessage, UserId,
    };

    pub use crate::responses::default_registry;

    pub use amadeus_runtime::prelude::*;
}
