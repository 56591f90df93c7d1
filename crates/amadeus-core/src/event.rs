//! Inbound message events.
//!
//! A [`MessageEvent`] is the normalized, platform-independent view of a single
//! chat message. Adapters build one per inbound message and hand it to the
//! runtime; from then on it is never mutated.
//!
//! ```rust,ignore
//! use amadeus_core::{Author, ChannelId, MessageEvent, MessageId, UserId};
//!
//! let event = MessageEvent::new(
//!     MessageId(1),
//!     ChannelId(10),
//!     Author::new(UserId(42), "okabe"),
//!     ".hug @kurisu",
//! )
//! .with_mention(UserId(7), "kurisu");
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake! {
    /// Identifier of a user (including the bot itself).
    UserId
}

snowflake! {
    /// Identifier of a channel messages are posted in.
    ChannelId
}

snowflake! {
    /// Identifier of a single message.
    MessageId
}

snowflake! {
    /// Identifier of a platform custom emoji.
    EmojiId
}

// ============================================================================
// Message parts
// ============================================================================

/// The author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    /// Account name.
    pub name: String,
    /// Per-channel nickname, if one is set.
    #[serde(default)]
    pub nick: Option<String>,
}

impl Author {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nick: None,
        }
    }

    /// Sets the nickname.
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    /// The nickname if set, otherwise the account name.
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.name)
    }
}

/// A user mentioned in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: UserId,
    pub name: String,
}

/// The message a reply points at, as resolved by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyReference {
    /// The original message still exists and was written by `author_id`.
    Resolved { author_id: UserId },
    /// The original message has been deleted.
    Deleted,
}

impl ReplyReference {
    /// Author of the original message, unless it was deleted.
    pub fn author_id(&self) -> Option<UserId> {
        match self {
            Self::Resolved { author_id } => Some(*author_id),
            Self::Deleted => None,
        }
    }
}

// ============================================================================
// MessageEvent
// ============================================================================

/// A normalized inbound chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub author: Author,
    /// Raw text content.
    pub text: String,
    /// Users mentioned in the message, in order of appearance.
    #[serde(default)]
    pub mentions: Vec<Mention>,
    /// Set when the message is a reply.
    #[serde(default)]
    pub reply: Option<ReplyReference>,
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    /// Creates an event stamped with the current time.
    pub fn new(
        message_id: MessageId,
        channel_id: ChannelId,
        author: Author,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            channel_id,
            author,
            text: text.into(),
            mentions: Vec::new(),
            reply: None,
            timestamp: Utc::now(),
        }
    }

    /// Adds a mentioned user.
    pub fn with_mention(mut self, id: UserId, name: impl Into<String>) -> Self {
        self.mentions.push(Mention {
            id,
            name: name.into(),
        });
        self
    }

    /// Marks the message as a reply.
    pub fn with_reply(mut self, reply: ReplyReference) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Overrides the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns `true` if `user` is mentioned.
    pub fn mentions_user(&self, user: UserId) -> bool {
        self.mentions.iter().any(|m| m.id == user)
    }

    /// Author of the replied-to message, if this is a reply to a live message.
    pub fn reply_author(&self) -> Option<UserId> {
        self.reply.and_then(|r| r.author_id())
    }
}
