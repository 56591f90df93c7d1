//! Responses: named, switchable trigger/action bindings.
//!
//! A [`Response`] owns one [`Trigger`] and a [`ResponseKind`] describing what
//! happens on a match and which state can be tuned at runtime:
//!
//! | Kind | State values | Effect |
//! |------|--------------|--------|
//! | [`Plain`](ResponseKind::Plain) | `"N/A"` (read-only) | always applies its action |
//! | [`SendOrReact`](ResponseKind::SendOrReact) | `"message"`, `"react"` | applies the selected action |
//! | [`RandomChance`](ResponseKind::RandomChance) | a number in `[0, 1]` | applies with that probability |
//!
//! State and the enabled flag may be changed through a shared reference while
//! other tasks dispatch against the same response; a change is visible to the
//! next check.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use tracing::trace;

use amadeus_core::{ApiResult, EmojiId};

use crate::action::Action;
use crate::context::EventContext;
use crate::error::{StateError, StateResult};
use crate::trigger::Trigger;

/// State reported by responses without configurable state.
pub const NO_STATE: &str = "N/A";

/// Default probability for [`ResponseKind::RandomChance`].
pub const DEFAULT_CHANCE: f64 = 0.5;

/// Which of the two actions a send-or-react response uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Send a text message.
    #[default]
    Message,
    /// React to the triggering message.
    React,
}

impl ReplyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::React => "react",
        }
    }
}

impl fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplyMode {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "react" => Ok(Self::React),
            other => Err(StateError::InvalidMode(other.to_string())),
        }
    }
}

/// What a response does on a match, and its tunable state.
pub enum ResponseKind {
    /// Applies the action unconditionally. No state.
    Plain(Action),
    /// Holds both a send and a react action; `mode` selects one.
    SendOrReact {
        message: Action,
        react: Action,
        mode: RwLock<ReplyMode>,
    },
    /// Applies the action when a uniform draw in `[0, 1)` is below `chance`.
    RandomChance { action: Action, chance: RwLock<f64> },
}

impl ResponseKind {
    /// Short variant label for logs and listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::SendOrReact { .. } => "send_or_react",
            Self::RandomChance { .. } => "random_chance",
        }
    }
}

/// A named binding of a trigger to an action.
pub struct Response {
    name: String,
    trigger: Trigger,
    kind: ResponseKind,
    enabled: AtomicBool,
}

impl Response {
    /// Creates an enabled response that always applies `action`.
    pub fn new(name: impl Into<String>, trigger: Trigger, action: Action) -> Self {
        Self::with_kind(name, trigger, ResponseKind::Plain(action))
    }

    /// Creates a response that either sends `message` or reacts with `emoji`.
    pub fn send_or_react(
        name: impl Into<String>,
        trigger: Trigger,
        message: impl Into<String>,
        emoji: EmojiId,
        mode: ReplyMode,
    ) -> Self {
        Self::with_kind(
            name,
            trigger,
            ResponseKind::SendOrReact {
                message: Action::send(message),
                react: Action::react(emoji),
                mode: RwLock::new(mode),
            },
        )
    }

    /// Creates a response that applies `action` with probability `chance`.
    pub fn random_chance(
        name: impl Into<String>,
        trigger: Trigger,
        action: Action,
        chance: f64,
    ) -> StateResult<Self> {
        Ok(Self::with_kind(
            name,
            trigger,
            ResponseKind::RandomChance {
                action,
                chance: RwLock::new(validate_chance(chance)?),
            },
        ))
    }

    pub fn with_kind(name: impl Into<String>, trigger: Trigger, kind: ResponseKind) -> Self {
        Self {
            name: name.into(),
            trigger,
            kind,
            enabled: AtomicBool::new(true),
        }
    }

    /// Starts the response disabled.
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::SeqCst);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn kind(&self) -> &ResponseKind {
        &self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Current state as a string; [`NO_STATE`] for plain responses.
    pub fn state(&self) -> String {
        match &self.kind {
            ResponseKind::Plain(_) => NO_STATE.to_string(),
            ResponseKind::SendOrReact { mode, .. } => mode.read().to_string(),
            ResponseKind::RandomChance { chance, .. } => format_chance(*chance.read()),
        }
    }

    /// Parses and applies a new state. On error the previous state is kept.
    pub fn set_state(&self, state: &str) -> StateResult<()> {
        match &self.kind {
            ResponseKind::Plain(_) => Err(StateError::Unsupported {
                name: self.name.clone(),
            }),
            ResponseKind::SendOrReact { mode, .. } => {
                let parsed = state.parse::<ReplyMode>()?;
                *mode.write() = parsed;
                Ok(())
            }
            ResponseKind::RandomChance { chance, .. } => {
                let parsed = parse_chance(state)?;
                *chance.write() = parsed;
                Ok(())
            }
        }
    }

    /// The selected mode of a send-or-react response.
    pub fn mode(&self) -> Option<ReplyMode> {
        match &self.kind {
            ResponseKind::SendOrReact { mode, .. } => Some(*mode.read()),
            _ => None,
        }
    }

    /// The probability of a random-chance response.
    pub fn chance(&self) -> Option<f64> {
        match &self.kind {
            ResponseKind::RandomChance { chance, .. } => Some(*chance.read()),
            _ => None,
        }
    }

    /// The action a match would currently run.
    pub fn active_action(&self) -> &Action {
        match &self.kind {
            ResponseKind::Plain(action) | ResponseKind::RandomChance { action, .. } => action,
            ResponseKind::SendOrReact {
                message,
                react,
                mode,
            } => match *mode.read() {
                ReplyMode::Message => message,
                ReplyMode::React => react,
            },
        }
    }

    /// Evaluates the trigger. Disabled responses never evaluate it.
    pub async fn check(&self, ctx: &EventContext) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.trigger.check(ctx).await
    }

    /// Runs the response's effect for a matched message.
    pub async fn apply(&self, ctx: &EventContext) -> ApiResult<()> {
        if let ResponseKind::RandomChance { chance, .. } = &self.kind {
            let chance = *chance.read();
            let draw: f64 = rand::rng().random();
            if draw >= chance {
                trace!(response = %self.name, draw, chance, "Chance roll failed, not applying");
                return Ok(());
            }
        }
        self.active_action().apply(ctx).await
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("enabled", &self.is_enabled())
            .field("state", &self.state())
            .field("trigger", &self.trigger)
            .finish()
    }
}

fn validate_chance(chance: f64) -> StateResult<f64> {
    if (0.0..=1.0).contains(&chance) {
        Ok(chance)
    } else {
        Err(StateError::OutOfRange(chance))
    }
}

fn parse_chance(state: &str) -> StateResult<f64> {
    let value = state
        .trim()
        .parse::<f64>()
        .map_err(|_| StateError::NotANumber(state.to_string()))?;
    if value.is_nan() {
        return Err(StateError::NotANumber(state.to_string()));
    }
    validate_chance(value)
}

/// `0.5` → `"0.5"`, `1` → `"1.0"`.
fn format_chance(chance: f64) -> String {
    if chance.fract() == 0.0 {
        format!("{chance:.1}")
    } else {
        chance.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CHANNEL, Effect, RecordingBot, ctx_with, message};
    use amadeus_core::{Emoji, MessageId};

    fn send_or_react() -> Response {
        Response::send_or_react(
            "Thanks Bot",
            Trigger::contains(["thanks bot"]),
            "<a:kurisuthumbsup:7>",
            EmojiId(7),
            ReplyMode::Message,
        )
    }

    #[test]
    fn test_plain_state_is_read_only() {
        let r = Response::new("Nullpo", Trigger::contains(["nullpo"]), Action::send("gah!"));
        assert_eq!(r.state(), NO_STATE);
        assert_eq!(
            r.set_state("react"),
            Err(StateError::Unsupported {
                name: "Nullpo".into()
            })
        );
        assert_eq!(r.state(), NO_STATE);
    }

    #[test]
    fn test_send_or_react_state() {
        let r = send_or_react();
        assert_eq!(r.state(), "message");

        r.set_state("react").unwrap();
        assert_eq!(r.state(), "react");
        assert_eq!(r.mode(), Some(ReplyMode::React));

        assert_eq!(
            r.set_state("bogus"),
            Err(StateError::InvalidMode("bogus".into()))
        );
        assert_eq!(r.state(), "react");
    }

    #[tokio::test]
    async fn test_send_or_react_switches_action() {
        let emoji = Emoji {
            id: EmojiId(7),
            name: "kurisuthumbsup".into(),
            animated: true,
        };
        let bot = RecordingBot::with_emojis(vec![emoji]);
        let r = send_or_react();

        r.apply(&ctx_with(&bot, message("thanks bot"))).await.unwrap();
        r.set_state("react").unwrap();
        r.apply(&ctx_with(&bot, message("thanks bot"))).await.unwrap();

        assert_eq!(
            bot.effects(),
            vec![
                Effect::Text(CHANNEL, "<a:kurisuthumbsup:7>".into()),
                Effect::React(CHANNEL, MessageId(1), EmojiId(7)),
            ]
        );
    }

    #[test]
    fn test_chance_state_validation() {
        let r = Response::random_chance(
            "Dad Bot",
            Trigger::contains(["i'm"]),
            Action::send("hi"),
            DEFAULT_CHANCE,
        )
        .unwrap();
        assert_eq!(r.state(), "0.5");

        r.set_state(" 0.25 ").unwrap();
        assert_eq!(r.chance(), Some(0.25));

        r.set_state("1").unwrap();
        assert_eq!(r.state(), "1.0");

        assert_eq!(
            r.set_state("often"),
            Err(StateError::NotANumber("often".into()))
        );
        assert_eq!(r.set_state("1.5"), Err(StateError::OutOfRange(1.5)));
        assert!(matches!(r.set_state("-0.1"), Err(StateError::OutOfRange(_))));
        assert!(matches!(r.set_state("NaN"), Err(StateError::NotANumber(_))));
        assert_eq!(r.state(), "1.0");
    }

    #[test]
    fn test_chance_out_of_range_at_construction() {
        let r = Response::random_chance("x", Trigger::Or(vec![]), Action::send("x"), 2.0);
        assert!(r.is_err());
    }

    #[test]
    fn test_chance_zero_never_forwards() {
        let bot = RecordingBot::new();
        let r = Response::random_chance("meow", Trigger::contains(["meow"]), Action::echo(), 0.0)
            .unwrap();
        let ctx = ctx_with(&bot, message("meow"));

        tokio_test::block_on(async {
            for _ in 0..1000 {
                r.apply(&ctx).await.unwrap();
            }
        });
        assert!(bot.effects().is_empty());
    }

    #[test]
    fn test_chance_one_always_forwards() {
        let bot = RecordingBot::new();
        let r = Response::random_chance("meow", Trigger::contains(["meow"]), Action::echo(), 1.0)
            .unwrap();
        let ctx = ctx_with(&bot, message("meow"));

        tokio_test::block_on(async {
            for _ in 0..1000 {
                r.apply(&ctx).await.unwrap();
            }
        });
        assert_eq!(bot.effects().len(), 1000);
    }

    #[tokio::test]
    async fn test_disabled_response_never_checks_trigger() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicUsize;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let r = Response::new(
            "flag",
            Trigger::predicate(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
            Action::send("x"),
        )
        .disabled();

        let bot = RecordingBot::new();
        assert!(!r.check(&ctx_with(&bot, message("x"))).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        r.set_enabled(true);
        assert!(r.check(&ctx_with(&bot, message("x"))).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_names_compare_case_insensitively() {
        let r = send_or_react();
        assert!(r.is_named("thanks bot"));
        assert!(r.is_named("THANKS BOT"));
        assert!(!r.is_named("thanks"));
    }
}
