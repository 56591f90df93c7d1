//! # Amadeus Core
//!
//! Shared vocabulary of the Amadeus response bot.
//!
//! - **Events**: [`MessageEvent`] and its parts ([`Author`], [`Mention`],
//!   [`ReplyReference`]) plus the snowflake id newtypes
//! - **Payloads**: [`RichMessage`] and resolved [`Emoji`]s
//! - **Capabilities**: the [`Bot`] trait a platform adapter implements so the
//!   engine can send, react and consult channel history
//!
//! ```text
//! ┌─────────────┐  MessageEvent  ┌────────────┐  first match  ┌──────────┐
//! │   Adapter   │───────────────▶│ Dispatcher │──────────────▶│  Action  │
//! │ (impl Bot)  │◀───────────────┴────────────┘               └────┬─────┘
//! └─────────────┘           send / react / history                 │
//!        ▲──────────────────────────────────────────────────────────┘
//! ```

pub mod bot;
pub mod error;
pub mod event;
pub mod message;

pub use bot::{Bot, BoxedBot};
pub use error::{ApiError, ApiResult};
pub use event::{
    Author, ChannelId, EmojiId, Mention, MessageEvent, MessageId, ReplyReference, UserId,
};
pub use message::{
    DEFAULT_COLOR, ERROR_COLOR, Emoji, RichField, RichMessage, SUCCESS_COLOR,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::bot::{Bot, BoxedBot};
    pub use super::error::{ApiError, ApiResult};
    pub use super::event::*;
    pub use super::message::{Emoji, RichMessage};
}
