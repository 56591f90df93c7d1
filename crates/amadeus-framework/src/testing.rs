//! Recording bot shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use amadeus_core::{
    ApiError, ApiResult, Author, Bot, ChannelId, Emoji, EmojiId, MessageEvent, MessageId,
    RichMessage, UserId,
};

use crate::context::EventContext;

pub const BOT_ID: UserId = UserId(587652588019908629);
pub const AUTHOR_ID: UserId = UserId(42);
pub const CHANNEL: ChannelId = ChannelId(100);

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Text(ChannelId, String),
    Rich(ChannelId, RichMessage),
    React(ChannelId, MessageId, EmojiId),
}

pub struct RecordingBot {
    effects: Mutex<Vec<Effect>>,
    emojis: HashMap<EmojiId, Emoji>,
    preceding: Mutex<ApiResult<Option<UserId>>>,
    history_calls: Mutex<usize>,
}

impl RecordingBot {
    pub fn new() -> Arc<Self> {
        Self::with_emojis(Vec::new())
    }

    pub fn with_emojis(emojis: Vec<Emoji>) -> Arc<Self> {
        Arc::new(Self {
            effects: Mutex::new(Vec::new()),
            emojis: emojis.into_iter().map(|e| (e.id, e)).collect(),
            preceding: Mutex::new(Ok(None)),
            history_calls: Mutex::new(0),
        })
    }

    pub fn set_preceding(&self, result: ApiResult<Option<UserId>>) {
        *self.preceding.lock() = result;
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().clone()
    }

    pub fn history_calls(&self) -> usize {
        *self.history_calls.lock()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    fn id(&self) -> UserId {
        BOT_ID
    }

    fn name(&self) -> &str {
        "Amadeus"
    }

    async fn send_text(&self, channel: ChannelId, text: &str) -> ApiResult<MessageId> {
        let mut effects = self.effects.lock();
        effects.push(Effect::Text(channel, text.to_string()));
        Ok(MessageId(effects.len() as u64))
    }

    async fn send_rich(&self, channel: ChannelId, message: &RichMessage) -> ApiResult<MessageId> {
        let mut effects = self.effects.lock();
        effects.push(Effect::Rich(channel, message.clone()));
        Ok(MessageId(effects.len() as u64))
    }

    fn resolve_emoji(&self, id: EmojiId) -> Option<Emoji> {
        self.emojis.get(&id).cloned()
    }

    async fn react(&self, channel: ChannelId, message: MessageId, emoji: &Emoji) -> ApiResult<()> {
        self.effects
            .lock()
            .push(Effect::React(channel, message, emoji.id));
        Ok(())
    }

    async fn preceding_author(
        &self,
        _channel: ChannelId,
        _before: MessageId,
    ) -> ApiResult<Option<UserId>> {
        *self.history_calls.lock() += 1;
        self.preceding.lock().clone()
    }
}

/// A bot whose every call fails.
pub struct BrokenBot;

#[async_trait]
impl Bot for BrokenBot {
    fn id(&self) -> UserId {
        BOT_ID
    }

    fn name(&self) -> &str {
        "Amadeus"
    }

    async fn send_text(&self, _channel: ChannelId, _text: &str) -> ApiResult<MessageId> {
        Err(ApiError::NotConnected)
    }

    async fn send_rich(&self, _channel: ChannelId, _message: &RichMessage) -> ApiResult<MessageId> {
        Err(ApiError::NotConnected)
    }

    fn resolve_emoji(&self, _id: EmojiId) -> Option<Emoji> {
        None
    }

    async fn react(&self, _channel: ChannelId, _message: MessageId, _emoji: &Emoji) -> ApiResult<()> {
        Err(ApiError::NotConnected)
    }

    async fn preceding_author(
        &self,
        _channel: ChannelId,
        _before: MessageId,
    ) -> ApiResult<Option<UserId>> {
        Err(ApiError::Timeout)
    }
}

pub fn message(text: &str) -> MessageEvent {
    MessageEvent::new(MessageId(1), CHANNEL, Author::new(AUTHOR_ID, "okabe"), text)
}

pub fn ctx_with(bot: &Arc<RecordingBot>, event: MessageEvent) -> EventContext {
    EventContext::new(event, bot.clone())
}

pub fn ctx(text: &str) -> EventContext {
    EventContext::new(message(text), RecordingBot::new())
}
