//! Triggers: predicates over an inbound message.
//!
//! A [`Trigger`] decides whether a response should fire for a message. The set
//! of variants is closed; composition happens through [`Trigger::Or`],
//! [`Trigger::And`] and the stateful [`Trigger::Cooldown`] wrapper.
//!
//! ```rust,ignore
//! use amadeus_framework::Trigger;
//!
//! // "thank" addressed to the bot in any of three ways
//! let trigger = Trigger::and([
//!     Trigger::contains(["thank"]),
//!     Trigger::or([
//!         Trigger::mentions(bot_id),
//!         Trigger::last_author(bot_id),
//!         Trigger::contains(["amadeus"]),
//!     ]),
//! ]);
//! ```
//!
//! Triggers that consult channel history fail closed: if the bot cannot
//! answer, the trigger reports no match.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use regex::{Regex, RegexBuilder};
use tracing::{trace, warn};

use amadeus_core::UserId;

use crate::context::EventContext;
use crate::cooldown::CooldownTracker;
use crate::error::BuildResult;

/// A type-erased synchronous check function.
pub type CheckFn = Arc<dyn Fn(&EventContext) -> bool + Send + Sync>;

/// Matches a message against a fixed list of phrases.
#[derive(Debug, Clone)]
pub struct Literals {
    phrases: Vec<String>,
    contains: bool,
    case_sensitive: bool,
}

impl Literals {
    /// `contains` switches from whole-text equality to substring search.
    pub fn new<I, S>(phrases: I, contains: bool, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases = phrases
            .into_iter()
            .map(Into::into)
            .map(|p: String| if case_sensitive { p } else { p.to_lowercase() })
            .collect();
        Self {
            phrases,
            contains,
            case_sensitive,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let folded;
        let text = if self.case_sensitive {
            text
        } else {
            folded = text.to_lowercase();
            &folded
        };

        self.phrases.iter().any(|phrase| {
            if self.contains {
                text.contains(phrase.as_str())
            } else {
                text == phrase
            }
        })
    }
}

/// A predicate over an inbound message.
pub enum Trigger {
    /// Text equals (or contains) one of the phrases.
    Literals(Literals),
    /// Pattern matches anywhere in the text.
    Regex(Regex),
    /// The user is mentioned, or (with `include_replies`) the message replies
    /// to a live message written by the user.
    Mentions {
        target: UserId,
        include_replies: bool,
    },
    /// The message immediately before this one was written by the user.
    LastAuthor(UserId),
    /// Any child matches. Empty → `false`.
    Or(Vec<Trigger>),
    /// Every child matches. Empty → `true`.
    And(Vec<Trigger>),
    /// Inner trigger, throttled per channel. Records a firing on match, so it
    /// must wrap everything else in the tree.
    Cooldown {
        tracker: CooldownTracker,
        inner: Box<Trigger>,
    },
    /// Host-supplied synchronous check.
    Predicate(CheckFn),
}

impl Trigger {
    /// Whole-text, case-insensitive match against any phrase.
    pub fn exact<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Literals(Literals::new(phrases, false, false))
    }

    /// Case-insensitive substring match against any phrase.
    pub fn contains<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Literals(Literals::new(phrases, true, false))
    }

    /// Literal match with explicit options.
    pub fn literals<I, S>(phrases: I, contains: bool, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Literals(Literals::new(phrases, contains, case_sensitive))
    }

    /// Compiles `pattern` case-insensitive and multi-line.
    pub fn regex(pattern: &str) -> BuildResult<Self> {
        Ok(Self::Regex(default_regex(pattern)?))
    }

    /// Mentions of `target`, including replies to `target`.
    pub fn mentions(target: UserId) -> Self {
        Self::Mentions {
            target,
            include_replies: true,
        }
    }

    /// Mentions of `target`, ignoring replies.
    pub fn pings(target: UserId) -> Self {
        Self::Mentions {
            target,
            include_replies: false,
        }
    }

    pub fn last_author(target: UserId) -> Self {
        Self::LastAuthor(target)
    }

    pub fn or(children: impl IntoIterator<Item = Trigger>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    pub fn and(children: impl IntoIterator<Item = Trigger>) -> Self {
        Self::And(children.into_iter().collect())
    }

    /// Throttles `inner` to once per `secs` seconds per channel.
    pub fn cooldown(secs: i64, inner: Trigger) -> Self {
        Self::Cooldown {
            tracker: CooldownTracker::from_secs(secs),
            inner: Box::new(inner),
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&EventContext) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Evaluates the trigger against `ctx`.
    pub fn check<'a>(&'a self, ctx: &'a EventContext) -> BoxFuture<'a, bool> {
        async move {
            match self {
                Self::Literals(literals) => literals.is_match(&ctx.text),
                Self::Regex(re) => re.is_match(&ctx.text),
                Self::Mentions {
                    target,
                    include_replies,
                } => {
                    ctx.mentions_user(*target)
                        || (*include_replies && ctx.reply_author() == Some(*target))
                }
                Self::LastAuthor(target) => {
                    match ctx
                        .bot()
                        .preceding_author(ctx.channel_id, ctx.message_id)
                        .await
                    {
                        Ok(author) => author == Some(*target),
                        Err(e) => {
                            warn!(
                                channel = %ctx.channel_id,
                                error = %e,
                                "History lookup failed, treating trigger as unmatched"
                            );
                            false
                        }
                    }
                }
                Self::Or(children) => {
                    for child in children {
                        if child.check(ctx).await {
                            return true;
                        }
                    }
                    false
                }
                Self::And(children) => {
                    for child in children {
                        if !child.check(ctx).await {
                            return false;
                        }
                    }
                    true
                }
                Self::Cooldown { tracker, inner } => {
                    if !inner.check(ctx).await {
                        return false;
                    }
                    let fired = tracker.try_fire(ctx.channel_id, ctx.timestamp);
                    if !fired {
                        trace!(channel = %ctx.channel_id, "Trigger matched but channel is cooling down");
                    }
                    fired
                }
                Self::Predicate(f) => f(ctx),
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literals(l) => f.debug_tuple("Literals").field(l).finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Self::Mentions {
                target,
                include_replies,
            } => f
                .debug_struct("Mentions")
                .field("target", target)
                .field("include_replies", include_replies)
                .finish(),
            Self::LastAuthor(target) => f.debug_tuple("LastAuthor").field(target).finish(),
            Self::Or(children) => f.debug_tuple("Or").field(children).finish(),
            Self::And(children) => f.debug_tuple("And").field(children).finish(),
            Self::Cooldown { tracker, inner } => f
                .debug_struct("Cooldown")
                .field("window", &tracker.window())
                .field("inner", inner)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Compiles a pattern with the engine's default flags (case-insensitive,
/// multi-line).
pub(crate) fn default_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}
