//! Outbound message payloads.
//!
//! Plain text is sent as `&str`; anything richer goes through [`RichMessage`],
//! a platform-neutral description of an embed that adapters render however
//! their platform allows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EmojiId;

/// Default accent color for rich messages.
pub const DEFAULT_COLOR: u32 = 0x521414;
/// Accent color for error reports.
pub const ERROR_COLOR: u32 = 0xab0306;
/// Accent color for success reports.
pub const SUCCESS_COLOR: u32 = 0x079100;

/// A titled, colored block of text with optional inline fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichMessage {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default)]
    pub fields: Vec<RichField>,
}

/// A name/value pair rendered inside a [`RichMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl RichMessage {
    /// Creates a message with the default color.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color: DEFAULT_COLOR,
            fields: Vec::new(),
        }
    }

    /// An untitled message used for roleplay actions (`.hug`, `.pat`).
    pub fn action(text: impl Into<String>) -> Self {
        Self::new("", text)
    }

    /// An error report.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new("Error", text).with_color(ERROR_COLOR)
    }

    /// A success report.
    pub fn success(text: impl Into<String>) -> Self {
        Self::new("Success", text).with_color(SUCCESS_COLOR)
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(RichField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// A custom emoji that has been resolved by the platform and can be used
/// as a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    pub id: EmojiId,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

impl fmt::Display for Emoji {
    /// Renders the inline markup form, e.g. `<a:kurisucry:1127702202203521044>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.animated { "a" } else { "" };
        write!(f, "<{}:{}:{}>", prefix, self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_markup() {
        let emoji = Emoji {
            id: EmojiId(1127702202203521044),
            name: "kurisucry".into(),
            animated: true,
        };
        assert_eq!(emoji.to_string(), "<a:kurisucry:1127702202203521044>");
    }

    #[test]
    fn test_report_colors() {
        assert_eq!(RichMessage::error("x").color, ERROR_COLOR);
        assert_eq!(RichMessage::success("x").title, "Success");
        assert_eq!(RichMessage::action("x").title, "");
    }
}
