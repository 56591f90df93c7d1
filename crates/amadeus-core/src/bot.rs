//! Bot trait and related types.
//!
//! This module defines the [`Bot`] trait: the set of platform capabilities
//! the response engine needs. It is implemented by a platform adapter and
//! shared with every dispatch as a [`BoxedBot`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::event::{ChannelId, EmojiId, MessageId, UserId};
use crate::message::{Emoji, RichMessage};

/// Platform capabilities available while handling a message.
///
/// Every call is bounded by the implementation's own timeouts; the engine
/// never adds one. Failures are reported as [`ApiError`](crate::ApiError)
/// and are never retried by the engine.
///
/// # API Design
///
/// - identity: [`id`](Bot::id), [`name`](Bot::name)
/// - history: [`preceding_author`](Bot::preceding_author)
/// - effects: [`send_text`](Bot::send_text), [`send_rich`](Bot::send_rich),
///   [`react`](Bot::react) after [`resolve_emoji`](Bot::resolve_emoji)
#[async_trait]
pub trait Bot: Send + Sync + 'static {
    /// The bot's own user id. Messages authored by this id are never dispatched.
    fn id(&self) -> UserId;

    /// The bot's own display name.
    fn name(&self) -> &str;

    /// Sends plain text to a channel, returning the new message's id.
    async fn send_text(&self, channel: ChannelId, text: &str) -> ApiResult<MessageId>;

    /// Sends a rich message to a channel, returning the new message's id.
    async fn send_rich(&self, channel: ChannelId, message: &RichMessage) -> ApiResult<MessageId>;

    /// Resolves an emoji id to something usable as a reaction.
    ///
    /// Returns `None` when the emoji is unknown or not accessible to the bot.
    fn resolve_emoji(&self, id: EmojiId) -> Option<Emoji>;

    /// Adds a reaction to a message.
    async fn react(&self, channel: ChannelId, message: MessageId, emoji: &Emoji) -> ApiResult<()>;

    /// Returns the author of the message immediately preceding `before` in
    /// `channel`, or `None` if `before` is the first message.
    async fn preceding_author(
        &self,
        channel: ChannelId,
        before: MessageId,
    ) -> ApiResult<Option<UserId>>;
}

/// A boxed Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;
