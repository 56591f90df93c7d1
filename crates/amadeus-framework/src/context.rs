//! Dispatch context.
//!
//! [`EventContext`] pairs an immutable [`MessageEvent`] with the [`BoxedBot`]
//! that received it. One context is created per inbound message and borrowed
//! by every trigger and action evaluated for that message.

use std::ops::Deref;

use amadeus_core::{BoxedBot, MessageEvent};

/// The context handed to triggers and actions.
///
/// Dereferences to the wrapped [`MessageEvent`], so event fields can be read
/// directly:
///
/// ```rust,ignore
/// fn is_loud(ctx: &EventContext) -> bool {
///     ctx.text.chars().all(|c| !c.is_lowercase())
/// }
/// ```
pub struct EventContext {
    event: MessageEvent,
    bot: BoxedBot,
}

impl EventContext {
    /// Creates a new context for `event` received by `bot`.
    pub fn new(event: MessageEvent, bot: BoxedBot) -> Self {
        Self { event, bot }
    }

    /// Returns the underlying event.
    pub fn event(&self) -> &MessageEvent {
        &self.event
    }

    /// Returns the bot that received the event.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Returns `true` if the bot itself wrote the message.
    pub fn is_self_authored(&self) -> bool {
        self.event.author.id == self.bot.id()
    }
}

impl Deref for EventContext {
    type Target = MessageEvent;

    fn deref(&self) -> &Self::Target {
        &self.event
    }
}

impl std::fmt::Debug for EventContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("event", &self.event)
            .field("bot", &self.bot.id())
            .finish()
    }
}
